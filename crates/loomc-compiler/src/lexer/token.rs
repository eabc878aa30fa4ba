//! Token kinds produced by the lexer.
//!
//! `RawKind` is what `logos` classifies directly from the byte stream —
//! letter-led words are not yet distinguished into keywords vs. identifiers,
//! since that distinction depends on the runtime-loaded keyword manifest
//! (`ReprTable`'s keyword flag), not a static table `logos` could embed in
//! its derive macro. [`super::classify`] turns a `RawKind::Word` into the
//! final [`TokenKind`] by interning it and checking that flag.

use logos::Logos;
use loomc_core::{Repr, Span};

#[derive(Logos, Clone, Copy, PartialEq, Eq, Debug)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum RawKind {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+")]
    FloatLiteral,

    #[regex(r"[0-9]+")]
    IntLiteral,

    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    #[regex(r"'([^'\\]|\\.)'")]
    CharLiteral,

    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<<")]
    ShlOp,
    #[token(">>")]
    ShrOp,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
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
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
}

/// A fully classified token: raw lexical class for punctuators/literals, or
/// `Keyword`/`Ident` for a word once resolved against the repr-tab keyword
/// flag.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TokenKind {
    Keyword(u32),
    Ident(Repr),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(Repr),
    CharLiteral(char),
    Raw(RawKind),
    /// One or more consecutive bytes `logos` could not classify, coalesced
    /// into a single error token so one malformed run produces one
    /// diagnostic instead of one per byte.
    Garbage,
    Eof,
}

#[derive(Clone, Copy, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
