//! Refinement expressions.

use super::{Binder, Interned, List};
use crate::{BinOp, BoundVar, Constant, EVar, KVid, Name, UnOp};
use core::fmt;
use itertools::Itertools;

/// Interned expression.
pub type Expr = Interned<ExprKind>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    FreeVar(Name),
    BoundVar(BoundVar),
    EVar(EVar),
    Constant(Constant),
    BinaryOp(BinOp, Expr, Expr),
    UnaryOp(UnOp, Expr),
    Tuple(List<Expr>),
    TupleProj(Expr, u32),
    IfThenElse(Expr, Expr, Expr),
    KVar(KVar),
    /// Lambda abstraction, binding one variable per sort of the binder
    Abs(Binder<Expr>),
    App(Expr, List<Expr>),
    /// Refinement to be inferred
    Hole,
}

/// Application of an unknown predicate to arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KVar {
    pub kvid: KVid,
    pub args: List<Expr>,
}

impl Expr {
    pub fn kind(&self) -> &ExprKind {
        self
    }

    pub fn as_constant(&self) -> Option<Constant> {
        match self.kind() {
            ExprKind::Constant(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_constant()?.as_bool()
    }

    pub fn is_true(&self) -> bool {
        self.as_bool() == Some(true)
    }

    pub fn is_hole(&self) -> bool {
        matches!(self.kind(), ExprKind::Hole)
    }
}

impl fmt::Display for KVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.kvid, self.args.iter().format(", "))
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FreeVar(x) => x.fmt(f),
            Self::BoundVar(v) => v.fmt(f),
            Self::EVar(e) => e.fmt(f),
            Self::Constant(c) => c.fmt(f),
            Self::BinaryOp(op, l, r) => write!(f, "({} {} {})", l, op, r),
            Self::UnaryOp(op, e) => write!(f, "{}{}", op, e),
            Self::Tuple(es) if es.len() == 1 => write!(f, "({},)", es[0]),
            Self::Tuple(es) => write!(f, "({})", es.iter().format(", ")),
            Self::TupleProj(e, n) => write!(f, "{}.{}", e, n),
            Self::IfThenElse(c, t, e) => write!(f, "if {} {{ {} }} else {{ {} }}", c, t, e),
            Self::KVar(kvar) => kvar.fmt(f),
            Self::Abs(b) => {
                let vars = b.vars().iter().format(", ");
                write!(f, "(λ{}. {})", vars, b.value())
            }
            Self::App(func, args) => write!(f, "{}({})", func, args.iter().format(", ")),
            Self::Hole => write!(f, "*"),
        }
    }
}
