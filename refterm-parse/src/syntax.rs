//! Unscoped syntax trees for sorts, expressions and types.
//!
//! Identifiers are kept as they were written;
//! resolving them to bound or free variables is left to the scoper.

use alloc::{boxed::Box, vec::Vec};
use core::fmt::{self, Display};

/// Sort of a refinement expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sort {
    Int,
    Bool,
    Loc,
    Tuple(Vec<Sort>),
    /// Function sort, given by input sorts and output sort.
    Func(Vec<Sort>, Box<Sort>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Iff,
    Imp,
    Or,
    And,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnOp {
    Not,
    Neg,
}

/// Parameter of a binder, such as the `x: int` in `|x: int| x + 1`.
pub type Param<S> = (S, Sort);

/// Refinement expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr<S> {
    Var(S),
    Int(u128),
    Bool(bool),
    /// Refinement to be inferred (`*`)
    Hole,
    /// Existential variable (`?n`)
    EVar(u32),
    /// Application of a kvar (`$n(e1, ..., en)`)
    KVar(u32, Vec<Self>),
    BinOp(BinOp, Box<Self>, Box<Self>),
    UnOp(UnOp, Box<Self>),
    Tuple(Vec<Self>),
    Proj(Box<Self>, u32),
    Ite(Box<Self>, Box<Self>, Box<Self>),
    /// Lambda abstraction (`|x: s, ...| e`)
    Abs(Vec<Param<S>>, Box<Self>),
    App(Box<Self>, Vec<Self>),
}

/// Base type, possibly applied to generic arguments, such as `i32` or `Vec<i32[n]>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Base<S> {
    pub name: S,
    pub args: Vec<Ty<S>>,
}

/// Refinement type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty<S> {
    /// `b[e]`
    Indexed(Base<S>, Expr<S>),
    /// `b`, that is, a base type with an arbitrary index
    Base(Base<S>),
    /// `{x: s, ... . t}`
    Exists(Vec<Param<S>>, Box<Self>),
    /// `{t | e}`
    Constr(Box<Self>, Expr<S>),
    Tuple(Vec<Self>),
    /// `&t` or `&mut t`
    Ref(bool, Box<Self>),
    /// `#n`
    Param(u32),
    Uninit,
    Never,
}

impl BinOp {
    /// Binding strength of the operator; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Iff | Self::Imp => 1,
            Self::Or => 2,
            Self::And => 3,
            Self::Eq | Self::Ne | Self::Gt | Self::Ge | Self::Lt | Self::Le => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::Mod => 6,
        }
    }

    /// Return true if `a op b op c` means `a op (b op c)`.
    pub fn is_right_assoc(self) -> bool {
        matches!(self, Self::Imp)
    }
}

impl Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Iff => "<=>",
            Self::Imp => "=>",
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        };
        s.fmt(f)
    }
}

impl Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Not => "!".fmt(f),
            Self::Neg => "-".fmt(f),
        }
    }
}

/// Write the elements of an iterator separated by commas.
pub(crate) fn commas<T: Display>(
    iter: impl IntoIterator<Item = T>,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    let mut iter = iter.into_iter().peekable();
    while let Some(x) = iter.next() {
        x.fmt(f)?;
        iter.peek().iter().try_for_each(|_| write!(f, ", "))?;
    }
    Ok(())
}

fn params<S: Display>(ps: &[Param<S>], f: &mut fmt::Formatter) -> fmt::Result {
    commas(ps.iter().map(|(x, s)| Typed(x, s)), f)
}

struct Typed<'a, X, S>(&'a X, &'a S);

impl<X: Display, S: Display> Display for Typed<'_, X, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.0, self.1)
    }
}

impl Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Loc => write!(f, "loc"),
            Self::Tuple(sorts) if sorts.len() == 1 => write!(f, "({},)", sorts[0]),
            Self::Tuple(sorts) => {
                write!(f, "(")?;
                commas(sorts, f)?;
                write!(f, ")")
            }
            Self::Func(inputs, output) => {
                write!(f, "fn(")?;
                commas(inputs, f)?;
                write!(f, ") -> {}", output)
            }
        }
    }
}

/// Expressions are printed fully parenthesised,
/// so that printing and parsing again yields the same tree.
impl<S: Display> Display for Expr<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Var(x) => x.fmt(f),
            Self::Int(n) => n.fmt(f),
            Self::Bool(b) => b.fmt(f),
            Self::Hole => write!(f, "*"),
            Self::EVar(n) => write!(f, "?{}", n),
            Self::KVar(n, args) => {
                write!(f, "${}(", n)?;
                commas(args, f)?;
                write!(f, ")")
            }
            Self::BinOp(op, l, r) => write!(f, "({} {} {})", l, op, r),
            Self::UnOp(op, e) => write!(f, "{}{}", op, e),
            Self::Tuple(es) if es.len() == 1 => write!(f, "({},)", es[0]),
            Self::Tuple(es) => {
                write!(f, "(")?;
                commas(es, f)?;
                write!(f, ")")
            }
            Self::Proj(e, n) => write!(f, "{}.{}", Postfix(e), n),
            Self::Ite(c, t, e) => write!(f, "if {} {{ {} }} else {{ {} }}", c, t, e),
            Self::Abs(ps, body) => {
                write!(f, "(|")?;
                params(ps, f)?;
                write!(f, "| {})", body)
            }
            Self::App(func, args) => {
                write!(f, "{}(", Postfix(func))?;
                commas(args, f)?;
                write!(f, ")")
            }
        }
    }
}

/// Expression in front of a postfix operator (projection or application).
struct Postfix<'a, S>(&'a Expr<S>);

impl<S: Display> Display for Postfix<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Expr::UnOp(..) => write!(f, "({})", self.0),
            e => e.fmt(f),
        }
    }
}

impl<S: Display> Display for Base<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name.fmt(f)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            commas(&self.args, f)?;
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl<S: Display> Display for Ty<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Indexed(b, e) => write!(f, "{}[{}]", b, e),
            Self::Base(b) => b.fmt(f),
            Self::Exists(ps, ty) => {
                write!(f, "{{")?;
                params(ps, f)?;
                write!(f, ". {}}}", ty)
            }
            Self::Constr(ty, e) => write!(f, "{{{} | {}}}", ty, e),
            Self::Tuple(tys) if tys.len() == 1 => write!(f, "({},)", tys[0]),
            Self::Tuple(tys) => {
                write!(f, "(")?;
                commas(tys, f)?;
                write!(f, ")")
            }
            Self::Ref(false, ty) => write!(f, "&{}", ty),
            Self::Ref(true, ty) => write!(f, "&mut {}", ty),
            Self::Param(n) => write!(f, "#{}", n),
            Self::Uninit => write!(f, "uninit"),
            Self::Never => write!(f, "!"),
        }
    }
}
