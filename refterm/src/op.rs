//! Operators and constants, including their evaluation.

use core::fmt;
pub use refterm_parse::syntax::{BinOp, UnOp};

/// Constant of sort `int` or `bool`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i128),
    Bool(bool),
}

impl Constant {
    pub const TRUE: Self = Self::Bool(true);
    pub const FALSE: Self = Self::Bool(false);

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            Self::Int(_) => None,
        }
    }

    pub fn as_int(self) -> Option<i128> {
        match self {
            Self::Int(i) => Some(i),
            Self::Bool(_) => None,
        }
    }

    /// Evaluate a binary operation on two constants.
    ///
    /// Return `None` if the operands have unsuitable sorts,
    /// or if the operation overflows or divides by zero.
    /// Division and remainder are Euclidean.
    ///
    /// ~~~
    /// # use refterm::{BinOp, Constant::*};
    /// assert_eq!(Int(-7).eval_binary(BinOp::Div, Int(2)), Some(Int(-4)));
    /// assert_eq!(Int(-7).eval_binary(BinOp::Mod, Int(2)), Some(Int(1)));
    /// assert_eq!(Int(1).eval_binary(BinOp::Div, Int(0)), None);
    /// assert_eq!(Int(i128::MAX).eval_binary(BinOp::Add, Int(1)), None);
    /// assert_eq!(Bool(false).eval_binary(BinOp::Imp, Bool(false)), Some(Bool(true)));
    /// assert_eq!(Int(1).eval_binary(BinOp::And, Bool(true)), None);
    /// ~~~
    pub fn eval_binary(self, op: BinOp, rhs: Self) -> Option<Self> {
        use BinOp::*;
        match (self, rhs) {
            (Self::Int(l), Self::Int(r)) => match op {
                Add => l.checked_add(r).map(Self::Int),
                Sub => l.checked_sub(r).map(Self::Int),
                Mul => l.checked_mul(r).map(Self::Int),
                Div => l.checked_div_euclid(r).map(Self::Int),
                Mod => l.checked_rem_euclid(r).map(Self::Int),
                Eq => Some(Self::Bool(l == r)),
                Ne => Some(Self::Bool(l != r)),
                Gt => Some(Self::Bool(l > r)),
                Ge => Some(Self::Bool(l >= r)),
                Lt => Some(Self::Bool(l < r)),
                Le => Some(Self::Bool(l <= r)),
                Iff | Imp | Or | And => None,
            },
            (Self::Bool(l), Self::Bool(r)) => match op {
                Iff | Eq => Some(Self::Bool(l == r)),
                Ne => Some(Self::Bool(l != r)),
                Imp => Some(Self::Bool(!l || r)),
                Or => Some(Self::Bool(l || r)),
                And => Some(Self::Bool(l && r)),
                Gt | Ge | Lt | Le | Add | Sub | Mul | Div | Mod => None,
            },
            _ => None,
        }
    }

    /// Evaluate a unary operation on a constant.
    pub fn eval_unary(self, op: UnOp) -> Option<Self> {
        match (op, self) {
            (UnOp::Not, Self::Bool(b)) => Some(Self::Bool(!b)),
            (UnOp::Neg, Self::Int(i)) => i.checked_neg().map(Self::Int),
            _ => None,
        }
    }
}

impl From<bool> for Constant {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i128> for Constant {
    fn from(i: i128) -> Self {
        Self::Int(i)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int(i) => i.fmt(f),
            Self::Bool(b) => b.fmt(f),
        }
    }
}

#[test]
fn unary() {
    assert_eq!(Constant::Int(i128::MIN).eval_unary(UnOp::Neg), None);
    assert_eq!(Constant::TRUE.eval_unary(UnOp::Not), Some(Constant::FALSE));
    assert_eq!(Constant::Int(3).eval_unary(UnOp::Not), None);
}
