//! Sorts of refinement expressions.

use super::List;
use core::fmt;
use itertools::Itertools;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sort {
    Int,
    Bool,
    Loc,
    Tuple(List<Sort>),
    /// Function sort, holding the input sorts followed by the output sort.
    Func(List<Sort>),
}

impl Sort {
    /// Return the input sorts and the output sort of a function sort.
    pub fn as_func(&self) -> Option<(&[Sort], &Sort)> {
        match self {
            Self::Func(sorts) => sorts.split_last().map(|(out, inputs)| (inputs, out)),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Sort]> {
        match self {
            Self::Tuple(sorts) => Some(sorts),
            _ => None,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Loc => write!(f, "loc"),
            Self::Tuple(sorts) if sorts.len() == 1 => write!(f, "({},)", sorts[0]),
            Self::Tuple(sorts) => write!(f, "({})", sorts.iter().format(", ")),
            Self::Func(sorts) => match sorts.split_last() {
                Some((out, inputs)) => write!(f, "fn({}) -> {}", inputs.iter().format(", "), out),
                None => write!(f, "fn()"),
            },
        }
    }
}
