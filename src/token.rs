use crate::error::Span;
use crate::symtab::Category;
use smartstring::alias::String;
use std::fmt;

/// Lexical class of a completed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Constant,
    SpecialSymbol,
}

impl TokenKind {
    /// Symbol-table category for identifiers and constants.
    pub fn category(self) -> Option<Category> {
        match self {
            TokenKind::Identifier => Some(Category::Identifier),
            TokenKind::Constant => Some(Category::Constant),
            TokenKind::Keyword | TokenKind::SpecialSymbol => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Keyword => "Keyword",
            TokenKind::Identifier => "Identifier",
            TokenKind::Constant => "Constant",
            TokenKind::SpecialSymbol => "Special Symbol",
        })
    }
}

/// A completed token as queued for the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// 1-based source line.
    pub line: usize,
    pub span: Span,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexeme)
    }
}
