use core::fmt::{self, Display};
use logos::Logos;

#[derive(Logos, Clone, Debug, PartialEq, Eq)]
pub enum Token<'s> {
    #[token("(")]
    LPar,

    #[token(")")]
    RPar,

    #[token("[")]
    LBrk,

    #[token("]")]
    RBrk,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token("|")]
    Bar,

    #[token("||")]
    OrOr,

    #[token("&")]
    Amp,

    #[token("&&")]
    AndAnd,

    #[token("!")]
    Bang,

    #[token("==")]
    EqEq,

    #[token("!=")]
    Ne,

    #[token("<")]
    Lt,

    #[token("<=")]
    Le,

    #[token(">")]
    Gt,

    #[token(">=")]
    Ge,

    #[token("=>")]
    FatArrow,

    #[token("<=>")]
    Iff,

    #[token("->")]
    Arrow,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("$")]
    Dollar,

    #[token("#")]
    Hash,

    #[token("?")]
    Question,

    #[regex("[0-9]+")]
    Int(&'s str),

    #[regex("[a-zA-Z_][a-zA-Z0-9_']*")]
    Ident(&'s str),

    // Logos requires one token variant to handle errors,
    // it can be named anything you wish.
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    #[error]
    Error,
}

impl<'s> Display for Token<'s> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LPar => "(",
            Self::RPar => ")",
            Self::LBrk => "[",
            Self::RBrk => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Colon => ":",
            Self::Bar => "|",
            Self::OrOr => "||",
            Self::Amp => "&",
            Self::AndAnd => "&&",
            Self::Bang => "!",
            Self::EqEq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::FatArrow => "=>",
            Self::Iff => "<=>",
            Self::Arrow => "->",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Dollar => "$",
            Self::Hash => "#",
            Self::Question => "?",
            Self::Int(n) => n,
            Self::Ident(s) => s,
            Self::Error => "<error>",
        };
        s.fmt(f)
    }
}

#[test]
fn tokens() {
    let toks: alloc::vec::Vec<_> = Token::lexer("x.0 <= 12 // comment\n=> |y| y").collect();
    use Token::*;
    let expected = [
        Ident("x"),
        Dot,
        Int("0"),
        Le,
        Int("12"),
        FatArrow,
        Bar,
        Ident("y"),
        Bar,
        Ident("y"),
    ];
    assert_eq!(toks, expected);
}

#[test]
fn large_ints() {
    let big = "340282366920938463463374607431768211456";
    let toks: alloc::vec::Vec<_> = Token::lexer(big).collect();
    assert_eq!(toks, [Token::Int(big)]);
}

#[test]
fn longest_match() {
    let toks: alloc::vec::Vec<_> = Token::lexer("<=> && & || |").collect();
    use Token::*;
    assert_eq!(toks, [Iff, AndAnd, Amp, OrOr, Bar]);
}
