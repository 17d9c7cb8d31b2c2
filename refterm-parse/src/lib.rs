//! Parser for a textual notation of refinement sorts, expressions and types.
//!
//! The parser yields unscoped syntax trees,
//! in which variables are still referred to by their names.
//!
//! Example usage:
//!
//! ~~~
//! use refterm_parse::{parse_expr, parse_ty, Error};
//! use refterm_parse::syntax::{Base, Expr, Ty};
//!
//! let e = parse_expr("x + 1 > 0 && p")?;
//! assert_eq!(e.to_string(), "(((x + 1) > 0) && p)");
//!
//! let t = parse_ty("{v: int. {i32[v] | v > 0}}")?;
//! assert!(matches!(t, Ty::Exists(..)));
//!
//! assert_eq!(parse_ty("bool")?, Ty::Base(Base { name: "bool", args: Vec::new() }));
//! assert_eq!(parse_expr("1 +"), Err(Error::UnexpectedEnd("expression")));
//! # Ok::<_, Error>(())
//! ~~~
#![no_std]

extern crate alloc;

pub mod lex;
mod parse;
pub mod syntax;

pub use lex::Token;
pub use parse::{Error, Parser};

use syntax::{Expr, Sort, Ty};

/// Parse a complete input with the given function.
fn complete<'s, T>(
    s: &'s str,
    f: impl FnOnce(&mut Parser<'s>) -> Result<T, Error>,
) -> Result<T, Error> {
    let mut parser = Parser::new(s)?;
    let x = f(&mut parser)?;
    parser.finish()?;
    Ok(x)
}

/// Parse a sort, such as `fn(int, (bool, loc)) -> int`.
pub fn parse_sort(s: &str) -> Result<Sort, Error> {
    complete(s, Parser::sort)
}

/// Parse an expression, such as `if x > 0 { x } else { -x }`.
pub fn parse_expr(s: &str) -> Result<Expr<&str>, Error> {
    complete(s, Parser::expr)
}

/// Parse a type, such as `{n: int. {Vec<i32>[n] | n > 0}}`.
pub fn parse_ty(s: &str) -> Result<Ty<&str>, Error> {
    complete(s, Parser::ty)
}
