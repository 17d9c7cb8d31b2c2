//! Recursive-descent parsing of token streams.

use crate::syntax::{Base, BinOp, Expr, Param, Sort, Ty, UnOp};
use crate::Token;
use alloc::{boxed::Box, vec::Vec};
use core::fmt::{self, Display};
use logos::Logos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// the lexer encountered a character sequence that is not a token
    InvalidToken,
    /// the input ended while the given item was expected
    UnexpectedEnd(&'static str),
    /// a token was found where the given item was expected
    Expected(&'static str),
    /// the input contains tokens after a complete item
    TrailingInput,
    /// an integer literal does not fit into the given position
    IntTooLarge,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnexpectedEnd(exp) => write!(f, "unexpected end of input, expected {}", exp),
            Self::Expected(exp) => write!(f, "expected {}", exp),
            Self::TrailingInput => write!(f, "unexpected input after end"),
            Self::IntTooLarge => write!(f, "integer literal too large"),
        }
    }
}

type Result<T> = core::result::Result<T, Error>;

/// Parser state: a fully lexed input and the position of the next token.
pub struct Parser<'s> {
    tokens: Vec<Token<'s>>,
    pos: usize,
}

impl<'s> Parser<'s> {
    /// Lex the whole input.
    pub fn new(s: &'s str) -> Result<Self> {
        let tokens: Vec<_> = Token::lexer(s).collect();
        if tokens.contains(&Token::Error) {
            return Err(Error::InvalidToken);
        }
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> Option<&Token<'s>> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token<'s>> {
        self.tokens.get(self.pos + n)
    }

    fn next(&mut self) -> Option<Token<'s>> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Consume the next token if it equals `tok`.
    fn eat(&mut self, tok: &Token<'s>) -> bool {
        let found = self.peek() == Some(tok);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect(&mut self, tok: Token<'s>, what: &'static str) -> Result<()> {
        match self.next() {
            Some(t) if t == tok => Ok(()),
            Some(_) => Err(Error::Expected(what)),
            None => Err(Error::UnexpectedEnd(what)),
        }
    }

    fn ident(&mut self) -> Result<&'s str> {
        match self.next() {
            Some(Token::Ident(s)) => Ok(s),
            Some(_) => Err(Error::Expected("identifier")),
            None => Err(Error::UnexpectedEnd("identifier")),
        }
    }

    fn index(&mut self) -> Result<u32> {
        match self.next() {
            Some(Token::Int(n)) => n.parse().map_err(|_| Error::IntTooLarge),
            Some(_) => Err(Error::Expected("integer")),
            None => Err(Error::UnexpectedEnd("integer")),
        }
    }

    /// Succeed if all tokens have been consumed.
    pub fn finish(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(Error::TrailingInput),
        }
    }

    /// Parse a list of items separated by commas until `close`.
    ///
    /// A trailing comma is permitted.
    /// Returns the items and whether any comma was seen.
    fn seq<T>(
        &mut self,
        close: Token<'s>,
        what: &'static str,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<(Vec<T>, bool)> {
        let mut items = Vec::new();
        let mut comma = false;
        while !self.eat(&close) {
            items.push(item(self)?);
            if self.eat(&Token::Comma) {
                comma = true;
            } else {
                return self.expect(close, what).map(|()| (items, comma));
            }
        }
        Ok((items, comma))
    }

    pub fn sort(&mut self) -> Result<Sort> {
        match self.next() {
            Some(Token::Ident("int")) => Ok(Sort::Int),
            Some(Token::Ident("bool")) => Ok(Sort::Bool),
            Some(Token::Ident("loc")) => Ok(Sort::Loc),
            Some(Token::LPar) => {
                let (sorts, comma) = self.seq(Token::RPar, ")", Self::sort)?;
                match <[Sort; 1]>::try_from(sorts) {
                    Ok([sort]) if !comma => Ok(sort),
                    Ok(sorts) => Ok(Sort::Tuple(sorts.into())),
                    Err(sorts) => Ok(Sort::Tuple(sorts)),
                }
            }
            Some(Token::Ident("fn")) => {
                self.expect(Token::LPar, "(")?;
                let (inputs, _) = self.seq(Token::RPar, ")", Self::sort)?;
                self.expect(Token::Arrow, "->")?;
                Ok(Sort::Func(inputs, Box::new(self.sort()?)))
            }
            Some(_) => Err(Error::Expected("sort")),
            None => Err(Error::UnexpectedEnd("sort")),
        }
    }

    /// Parse `x: s`.
    fn param(&mut self) -> Result<Param<&'s str>> {
        let x = self.ident()?;
        self.expect(Token::Colon, ":")?;
        Ok((x, self.sort()?))
    }

    pub fn expr(&mut self) -> Result<Expr<&'s str>> {
        self.binary(1)
    }

    fn binop(&self) -> Option<BinOp> {
        let op = match self.peek()? {
            Token::Iff => BinOp::Iff,
            Token::FatArrow => BinOp::Imp,
            Token::OrOr => BinOp::Or,
            Token::AndAnd => BinOp::And,
            Token::EqEq => BinOp::Eq,
            Token::Ne => BinOp::Ne,
            Token::Gt => BinOp::Gt,
            Token::Ge => BinOp::Ge,
            Token::Lt => BinOp::Lt,
            Token::Le => BinOp::Le,
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Star => BinOp::Mul,
            Token::Slash => BinOp::Div,
            Token::Percent => BinOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing: parse operators binding at least as strong as `min`.
    fn binary(&mut self, min: u8) -> Result<Expr<&'s str>> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.binop().filter(|op| op.precedence() >= min) {
            self.pos += 1;
            let next = if op.is_right_assoc() {
                op.precedence()
            } else {
                op.precedence() + 1
            };
            let rhs = self.binary(next)?;
            lhs = Expr::BinOp(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr<&'s str>> {
        if self.eat(&Token::Bang) {
            Ok(Expr::UnOp(UnOp::Not, Box::new(self.unary()?)))
        } else if self.eat(&Token::Minus) {
            Ok(Expr::UnOp(UnOp::Neg, Box::new(self.unary()?)))
        } else {
            self.postfix()
        }
    }

    fn postfix(&mut self) -> Result<Expr<&'s str>> {
        let mut e = self.atom()?;
        loop {
            if self.eat(&Token::Dot) {
                e = Expr::Proj(Box::new(e), self.index()?);
            } else if self.eat(&Token::LPar) {
                let (args, _) = self.seq(Token::RPar, ")", Self::expr)?;
                e = Expr::App(Box::new(e), args);
            } else {
                return Ok(e);
            }
        }
    }

    fn block(&mut self) -> Result<Expr<&'s str>> {
        self.expect(Token::LBrace, "{")?;
        let e = self.expr()?;
        self.expect(Token::RBrace, "}")?;
        Ok(e)
    }

    fn atom(&mut self) -> Result<Expr<&'s str>> {
        match self.next() {
            Some(Token::Int(n)) => n.parse().map(Expr::Int).map_err(|_| Error::IntTooLarge),
            Some(Token::Ident("true")) => Ok(Expr::Bool(true)),
            Some(Token::Ident("false")) => Ok(Expr::Bool(false)),
            Some(Token::Ident("if")) => {
                let cond = self.expr()?;
                let then = self.block()?;
                match self.next() {
                    Some(Token::Ident("else")) => (),
                    Some(_) => return Err(Error::Expected("else")),
                    None => return Err(Error::UnexpectedEnd("else")),
                }
                let els = self.block()?;
                Ok(Expr::Ite(Box::new(cond), Box::new(then), Box::new(els)))
            }
            Some(Token::Ident(x)) => Ok(Expr::Var(x)),
            Some(Token::Star) => Ok(Expr::Hole),
            Some(Token::Question) => Ok(Expr::EVar(self.index()?)),
            Some(Token::Dollar) => {
                let k = self.index()?;
                self.expect(Token::LPar, "(")?;
                let (args, _) = self.seq(Token::RPar, ")", Self::expr)?;
                Ok(Expr::KVar(k, args))
            }
            Some(Token::LPar) => {
                let (es, comma) = self.seq(Token::RPar, ")", Self::expr)?;
                match <[Expr<_>; 1]>::try_from(es) {
                    Ok([e]) if !comma => Ok(e),
                    Ok(es) => Ok(Expr::Tuple(es.into())),
                    Err(es) => Ok(Expr::Tuple(es)),
                }
            }
            Some(Token::OrOr) => Ok(Expr::Abs(Vec::new(), Box::new(self.expr()?))),
            Some(Token::Bar) => {
                let (params, _) = self.seq(Token::Bar, "|", Self::param)?;
                Ok(Expr::Abs(params, Box::new(self.expr()?)))
            }
            Some(_) => Err(Error::Expected("expression")),
            None => Err(Error::UnexpectedEnd("expression")),
        }
    }

    fn base(&mut self, name: &'s str) -> Result<Base<&'s str>> {
        let args = if self.eat(&Token::Lt) {
            self.seq(Token::Gt, ">", Self::ty)?.0
        } else {
            Vec::new()
        };
        Ok(Base { name, args })
    }

    pub fn ty(&mut self) -> Result<Ty<&'s str>> {
        match self.next() {
            Some(Token::Ident("uninit")) => Ok(Ty::Uninit),
            Some(Token::Ident(name)) => {
                let base = self.base(name)?;
                if self.eat(&Token::LBrk) {
                    let idx = self.expr()?;
                    self.expect(Token::RBrk, "]")?;
                    Ok(Ty::Indexed(base, idx))
                } else {
                    Ok(Ty::Base(base))
                }
            }
            Some(Token::LBrace) => {
                // `{x: s. ...}` starts with a parameter, `{t | e}` with a type
                let is_exists = matches!(
                    (self.peek(), self.peek_nth(1)),
                    (Some(Token::Ident(_)), Some(Token::Colon))
                );
                if is_exists {
                    let mut params = Vec::from([self.param()?]);
                    while self.eat(&Token::Comma) {
                        params.push(self.param()?)
                    }
                    self.expect(Token::Dot, ".")?;
                    let ty = self.ty()?;
                    self.expect(Token::RBrace, "}")?;
                    Ok(Ty::Exists(params, Box::new(ty)))
                } else {
                    let ty = self.ty()?;
                    self.expect(Token::Bar, "|")?;
                    let pred = self.expr()?;
                    self.expect(Token::RBrace, "}")?;
                    Ok(Ty::Constr(Box::new(ty), pred))
                }
            }
            Some(Token::LPar) => {
                let (tys, comma) = self.seq(Token::RPar, ")", Self::ty)?;
                match <[Ty<_>; 1]>::try_from(tys) {
                    Ok([ty]) if !comma => Ok(ty),
                    Ok(tys) => Ok(Ty::Tuple(tys.into())),
                    Err(tys) => Ok(Ty::Tuple(tys)),
                }
            }
            Some(Token::Amp) => {
                let mutable = self.eat(&Token::Ident("mut"));
                Ok(Ty::Ref(mutable, Box::new(self.ty()?)))
            }
            Some(Token::Bang) => Ok(Ty::Never),
            Some(Token::Hash) => Ok(Ty::Param(self.index()?)),
            Some(_) => Err(Error::Expected("type")),
            None => Err(Error::UnexpectedEnd("type")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn expr(s: &str) -> Result<Expr<&str>> {
        crate::parse_expr(s)
    }

    fn ty(s: &str) -> Result<Ty<&str>> {
        crate::parse_ty(s)
    }

    #[test]
    fn precedence() -> Result<()> {
        let e = expr("a + b * c == d && !p || q => r => s")?;
        let expected = "(((((a + (b * c)) == d) && !p) || q) => (r => s))";
        assert_eq!(e.to_string(), expected);
        Ok(())
    }

    #[test]
    fn left_assoc() -> Result<()> {
        assert_eq!(expr("a - b - c")?.to_string(), "((a - b) - c)");
        Ok(())
    }

    #[test]
    fn postfix() -> Result<()> {
        let e = expr("f(x, y).1.0")?;
        let f = Expr::App(Box::new(Expr::Var("f")), [Expr::Var("x"), Expr::Var("y")].into());
        let expected = Expr::Proj(Box::new(Expr::Proj(Box::new(f), 1)), 0);
        assert_eq!(e, expected);
        Ok(())
    }

    #[test]
    fn tuples() -> Result<()> {
        assert_eq!(expr("()")?, Expr::Tuple(Vec::new()));
        assert_eq!(expr("(a)")?, Expr::Var("a"));
        assert_eq!(expr("(a,)")?, Expr::Tuple([Expr::Var("a")].into()));
        assert_eq!(expr("(a, 1,)")?, Expr::Tuple([Expr::Var("a"), Expr::Int(1)].into()));
        Ok(())
    }

    #[test]
    fn atoms() -> Result<()> {
        assert_eq!(expr("*")?, Expr::Hole);
        assert_eq!(expr("?3")?, Expr::EVar(3));
        assert_eq!(expr("$0(a, b)")?.to_string(), "$0(a, b)");
        assert_eq!(expr("|x: int, p: (int, bool)| p.0 + x")?.to_string(), "(|x: int, p: (int, bool)| (p.0 + x))");
        assert_eq!(expr("|| true")?, Expr::Abs(Vec::new(), Box::new(Expr::Bool(true))));
        let ite = "if (x > 0) { x } else { -x }";
        assert_eq!(expr("if x > 0 { x } else { -x }")?.to_string(), ite);
        Ok(())
    }

    #[test]
    fn sorts() -> Result<()> {
        let s = crate::parse_sort("fn((int, bool), loc) -> bool")?;
        assert_eq!(s.to_string(), "fn((int, bool), loc) -> bool");
        assert_eq!(crate::parse_sort("(int)")?, Sort::Int);
        assert_eq!(crate::parse_sort("(int,)")?, Sort::Tuple([Sort::Int].into()));
        Ok(())
    }

    #[test]
    fn types() -> Result<()> {
        let t = ty("{n: int. {Vec<i32[n]>[n] | n > 0}}")?;
        assert_eq!(t.to_string(), "{n: int. {Vec<i32[n]>[n] | (n > 0)}}");
        assert_eq!(ty("(&mut bool, #1, !, uninit)")?.to_string(), "(&mut bool, #1, !, uninit)");
        Ok(())
    }

    #[test]
    fn reparse() -> Result<()> {
        let inputs = [
            "-x.0",
            "(-x).0",
            "!(a && b) <=> (c => d)",
            "if p { (1, 2) } else { (3, 4) }.1",
            "(|x: int| x * 2)(21)",
        ];
        for i in inputs {
            let e = expr(i)?;
            assert_eq!(expr(&e.to_string())?, e);
        }
        Ok(())
    }

    #[test]
    fn negative() {
        use Error::*;
        assert_eq!(expr("a +").unwrap_err(), UnexpectedEnd("expression"));
        assert_eq!(expr("(a b)").unwrap_err(), Expected(")"));
        assert_eq!(expr("a b").unwrap_err(), TrailingInput);
        assert_eq!(expr("a ~ b").unwrap_err(), InvalidToken);
        assert_eq!(expr("x.99999999999").unwrap_err(), IntTooLarge);
        assert_eq!(expr("if a { b }").unwrap_err(), UnexpectedEnd("else"));
        assert_eq!(ty("{x: int i32[x]}").unwrap_err(), Expected("."));
        assert_eq!(ty("{i32 x > 0}").unwrap_err(), Expected("|"));
        assert_eq!(crate::parse_sort("float").unwrap_err(), Expected("sort"));
    }

    #[test]
    fn negative_constructs() {
        use Error::*;
        // kvars, evars and parameters
        assert_eq!(expr("$0").unwrap_err(), UnexpectedEnd("("));
        assert_eq!(expr("$x(a)").unwrap_err(), Expected("integer"));
        assert_eq!(expr("?a").unwrap_err(), Expected("integer"));
        assert_eq!(ty("#a").unwrap_err(), Expected("integer"));
        // function sorts and lambdas
        assert_eq!(crate::parse_sort("fn(int) int").unwrap_err(), Expected("->"));
        assert_eq!(expr("|x int| x").unwrap_err(), Expected(":"));
        // generics, existentials and references
        assert_eq!(ty("Vec<i32").unwrap_err(), UnexpectedEnd(">"));
        assert_eq!(ty("{x: int. i32[x]").unwrap_err(), UnexpectedEnd("}"));
        assert_eq!(ty("&mut").unwrap_err(), UnexpectedEnd("type"));
        // integers
        let big = "340282366920938463463374607431768211456";
        assert_eq!(expr(big).unwrap_err(), IntTooLarge);
        assert_eq!(expr("340282366920938463463374607431768211455"), Ok(Expr::Int(u128::MAX)));
    }
}
