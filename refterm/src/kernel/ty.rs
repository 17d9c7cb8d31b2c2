//! Refinement types.

use super::{Binder, Expr, Interned, List, Sort};
use crate::{IntTy, ParamTy, RefKind, UintTy};
use alloc::string::String;
use core::fmt;
use itertools::Itertools;

/// Interned type.
pub type Ty = Interned<TyKind>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TyKind {
    /// `b[e]`: the values of base type `b` that are indexed by `e`
    Indexed(BaseTy, Expr),
    /// `{v: s. T}`
    Exists(Binder<Ty>),
    /// `{T | p}`: the values of type `T` for which `p` holds
    Constr(Expr, Ty),
    Param(ParamTy),
    Tuple(List<Ty>),
    Ref(RefKind, Ty),
    Uninit,
    Never,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseTy {
    Int(IntTy),
    Uint(UintTy),
    Bool,
    Adt(AdtDef, List<Ty>),
}

/// Algebraic data type, indexed by values of the given sort.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct AdtDefData {
    pub name: String,
    pub sort: Sort,
}

pub type AdtDef = Interned<AdtDefData>;

/// Function signature.
///
/// The `requires` clauses are assumed when the function is called,
/// and the `ensures` clauses hold when it returns.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FnSig {
    pub requires: List<Expr>,
    pub inputs: List<Ty>,
    pub output: Ty,
    pub ensures: List<Expr>,
}

/// Function signature quantified over refinement parameters.
pub type PolyFnSig = Binder<FnSig>;

impl Ty {
    pub fn kind(&self) -> &TyKind {
        self
    }

    /// Return the base type of an indexed type, possibly below refinements.
    pub fn base(&self) -> Option<&BaseTy> {
        match self.kind() {
            TyKind::Indexed(bty, _) => Some(bty),
            TyKind::Constr(_, ty) => ty.base(),
            _ => None,
        }
    }
}

impl BaseTy {
    /// Return the sort of the indices of the base type.
    pub fn sort(&self) -> Sort {
        match self {
            Self::Int(_) | Self::Uint(_) => Sort::Int,
            Self::Bool => Sort::Bool,
            Self::Adt(def, _) => def.sort.clone(),
        }
    }
}

impl fmt::Display for BaseTy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int(i) => i.fmt(f),
            Self::Uint(u) => u.fmt(f),
            Self::Bool => write!(f, "bool"),
            Self::Adt(def, args) if args.is_empty() => def.name.fmt(f),
            Self::Adt(def, args) => write!(f, "{}<{}>", def.name, args.iter().format(", ")),
        }
    }
}

impl fmt::Display for TyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Indexed(bty, e) => write!(f, "{}[{}]", bty, e),
            Self::Exists(b) => {
                let vars = b.vars().iter().format(", ");
                write!(f, "{{{}. {}}}", vars, b.value())
            }
            Self::Constr(p, ty) => write!(f, "{{{} | {}}}", ty, p),
            Self::Param(p) => p.fmt(f),
            Self::Tuple(tys) if tys.len() == 1 => write!(f, "({},)", tys[0]),
            Self::Tuple(tys) => write!(f, "({})", tys.iter().format(", ")),
            Self::Ref(rk, ty) => write!(f, "{}{}", rk, ty),
            Self::Uninit => write!(f, "uninit"),
            Self::Never => write!(f, "!"),
        }
    }
}

impl fmt::Display for FnSig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fn({}) -> {}", self.inputs.iter().format(", "), self.output)?;
        if !self.requires.is_empty() {
            write!(f, " requires {}", self.requires.iter().format(" && "))?;
        }
        if !self.ensures.is_empty() {
            write!(f, " ensures {}", self.ensures.iter().format(" && "))?;
        }
        Ok(())
    }
}
