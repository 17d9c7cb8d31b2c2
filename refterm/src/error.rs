//! Common error type.

use crate::{BoundVar, EVar, KVid, Name, ParamTy};
use alloc::string::String;
use core::fmt;

/// Error while lowering parsed syntax to terms.
#[derive(Debug, PartialEq, Eq)]
pub enum ScopeError {
    Redeclaration(String),
    UndeclaredName(String),
    UndeclaredAdt(String),
    /// a primitive base type was given generic arguments
    UnexpectedArgs(String),
    IntOutOfRange,
}

/// Error while substituting variables.
#[derive(Debug, PartialEq, Eq)]
pub enum SubstError {
    ArityMismatch { expected: usize, found: usize },
    BVarOutOfRange(BoundVar),
    MissingGenericArg(ParamTy),
}

/// Error while unifying or replacing existential variables.
#[derive(Debug, PartialEq, Eq)]
pub enum EVarError {
    Mismatch { formal: String, actual: String },
    Unsolved(EVar),
}

/// Error while checking the sorts of terms.
#[derive(Debug, PartialEq, Eq)]
pub enum WfError {
    SortMismatch { expected: String, found: String },
    UnboundName(Name),
    UnboundVar(BoundVar),
    ProjOutOfRange { index: u32, len: usize },
    ArityMismatch { expected: usize, found: usize },
    UnknownKVar(KVid),
    ExpectedTuple(String),
    ExpectedFunc(String),
    UnsolvedEVar(EVar),
    /// the sort of a hole cannot be determined from its context
    UninferableHole,
}

/// Common error type.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Parse(refterm_parse::Error),
    Scope(ScopeError),
    Subst(SubstError),
    EVar(EVarError),
    Wf(WfError),
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Redeclaration(x) => write!(f, "name `{}` is already declared", x),
            Self::UndeclaredName(x) => write!(f, "cannot find name `{}`", x),
            Self::UndeclaredAdt(x) => write!(f, "cannot find type `{}`", x),
            Self::UnexpectedArgs(x) => write!(f, "type `{}` takes no generic arguments", x),
            Self::IntOutOfRange => write!(f, "integer literal out of range"),
        }
    }
}

impl fmt::Display for SubstError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ArityMismatch { expected, found } => {
                write!(f, "expected {} arguments, found {}", expected, found)
            }
            Self::BVarOutOfRange(v) => write!(f, "bound variable {} out of range", v),
            Self::MissingGenericArg(p) => write!(f, "no argument for generic parameter {}", p),
        }
    }
}

impl fmt::Display for EVarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Mismatch { formal, actual } => {
                write!(f, "cannot unify `{}` with `{}`", formal, actual)
            }
            Self::Unsolved(e) => write!(f, "existential variable {} is unsolved", e),
        }
    }
}

impl fmt::Display for WfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SortMismatch { expected, found } => {
                write!(f, "mismatched sorts: expected `{}`, found `{}`", expected, found)
            }
            Self::UnboundName(x) => write!(f, "name {} has no sort", x),
            Self::UnboundVar(v) => write!(f, "bound variable {} has no binder", v),
            Self::ProjOutOfRange { index, len } => {
                write!(f, "projection {} out of range for tuple of length {}", index, len)
            }
            Self::ArityMismatch { expected, found } => {
                write!(f, "expected {} arguments, found {}", expected, found)
            }
            Self::UnknownKVar(k) => write!(f, "unknown kvar {}", k),
            Self::ExpectedTuple(s) => write!(f, "expected a tuple, found sort `{}`", s),
            Self::ExpectedFunc(s) => write!(f, "expected a function, found sort `{}`", s),
            Self::UnsolvedEVar(e) => write!(f, "existential variable {} is unsolved", e),
            Self::UninferableHole => write!(f, "cannot infer the sort of a hole"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse(err) => err.fmt(f),
            Self::Scope(err) => err.fmt(f),
            Self::Subst(err) => err.fmt(f),
            Self::EVar(err) => err.fmt(f),
            Self::Wf(err) => err.fmt(f),
        }
    }
}

impl core::error::Error for ScopeError {}
impl core::error::Error for SubstError {}
impl core::error::Error for EVarError {}
impl core::error::Error for WfError {}
impl core::error::Error for Error {}

impl From<refterm_parse::Error> for Error {
    fn from(err: refterm_parse::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<ScopeError> for Error {
    fn from(err: ScopeError) -> Self {
        Self::Scope(err)
    }
}

impl From<SubstError> for Error {
    fn from(err: SubstError) -> Self {
        Self::Subst(err)
    }
}

impl From<EVarError> for Error {
    fn from(err: EVarError) -> Self {
        Self::EVar(err)
    }
}

impl From<WfError> for Error {
    fn from(err: WfError) -> Self {
        Self::Wf(err)
    }
}

#[test]
fn errors() {
    use alloc::string::ToString;
    fn source(err: &dyn core::error::Error) -> Option<&dyn core::error::Error> {
        err.source()
    }
    let err = Error::from(ScopeError::IntOutOfRange);
    assert!(source(&err).is_none());
    assert_eq!(err.to_string(), ScopeError::IntOutOfRange.to_string());
}
