//! Source locations and error types shared by the scanner, the rule table and
//! the parser.
//!
//! Locations are line based: a [`Position`] is a 1-based line number plus a
//! 0-based character column, and a [`Span`] is a half-open range of columns on
//! one line (tokens never cross lines). The `span!` macro builds a `Span`
//! inline, which keeps test expectations short.
//!
//! # Examples
//!
//! ```rust
//! # use minilol::{Span, Position, span};
//! let sp = span!(2, 0, 7);
//! assert_eq!(sp.start, Position::new(2, 0));
//! assert_eq!(sp.len(), 7);
//! assert_eq!(sp.display(), "line 2, columns 0..7");
//! ```

use crate::codes::Code;
use crate::parser::ParserState;
use crate::symtab::Category;
use regex_automata::MatchError;
use regex_automata::dfa::dense::BuildError;
use smartstring::alias::String;
use std::fmt;
use thiserror::Error;

/// A 1-based line and 0-based column in source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 0-based character column.
    pub column: usize,
}

impl Position {
    /// Creates a position from a 1-based `line` and a 0-based `column`.
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A half-open column range `[start, end)` on a single line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Starting position (inclusive).
    pub start: Position,
    /// Ending position (exclusive).
    pub end: Position,
}

impl Span {
    /// Creates a span from explicit start and end positions.
    ///
    /// # Examples
    /// ```rust
    /// # use minilol::{Position, Span};
    /// let sp = Span::new(Position::new(1, 4), Position::new(1, 9));
    /// assert_eq!(sp, Span::on_line(1, 4, 5));
    /// ```
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span of `len` characters starting at `column` on `line`.
    #[inline]
    pub const fn on_line(line: usize, column: usize, len: usize) -> Self {
        Self {
            start: Position::new(line, column),
            end: Position::new(line, column + len),
        }
    }

    /// Line the span lies on.
    #[inline]
    pub fn line(&self) -> usize {
        self.start.line
    }

    /// Number of characters covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.column.saturating_sub(self.start.column)
    }

    /// Returns `true` if the span covers no characters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Pretty-print for diagnostics (human-readable).
    #[inline]
    pub fn display(&self) -> std::string::String {
        format!(
            "line {}, columns {}..{}",
            self.start.line, self.start.column, self.end.column
        )
    }
}

/// Build a [`Span`] from a line number and a `[start, end)` column range.
#[macro_export]
macro_rules! span {
    ($line:expr, $col_start:expr, $col_end:expr) => {
        $crate::Span {
            start: $crate::Position {
                line: $line,
                column: $col_start,
            },
            end: $crate::Position {
                line: $line,
                column: $col_end,
            },
        }
    };
}

/// A symbol name or code that the catalog does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown symbol name {0:?}")]
    UnknownName(String),

    #[error("unknown symbol code {0}")]
    UnknownCode(Code),
}

/// Failures while building the symbol catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("symbol {name:?} is already registered as code {existing}")]
    DuplicateName { name: String, existing: Code },

    #[error("code {code} is already registered for symbol {existing:?}")]
    DuplicateCode { code: Code, existing: String },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Failures while building the grammar rule table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar refers to an unregistered symbol: {0}")]
    Lookup(#[from] LookupError),

    /// Two rules of one non-terminal share a lookahead code; the table would
    /// not be simulable by a deterministic PDA.
    #[error("rules {first} and {second} of {owner} both fire on lookahead {lookahead}")]
    Overlap {
        owner: String,
        first: RuleTagText,
        second: RuleTagText,
        lookahead: String,
    },

    #[error("terminal {0} must have exactly one match rule on its own code")]
    BadTerminal(String),

    #[error("non-terminal {0} has no rules")]
    NoRules(String),

    #[error("symbol {0} cannot own a rule")]
    BadOwner(String),
}

/// Rendered rule tag, e.g. `44 - b`, carried by [`GrammarError`].
pub type RuleTagText = String;

/// Failures while building the scanner automata.
#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("cannot build scanner DFA: {0}")]
    Build(#[from] BuildError),

    #[error("cannot start scanner DFA: {0}")]
    Start(#[from] MatchError),
}

/// Which automaton rejected a malformed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexicalErrorKind {
    InvalidKeyword,
    InvalidIdentifier,
    InvalidConstant,
    /// The first character starts none of the token classes.
    InvalidCharacter,
}

impl fmt::Display for LexicalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidKeyword => "Invalid Keyword",
            Self::InvalidIdentifier => "Invalid Identifier",
            Self::InvalidConstant => "Invalid Constant",
            Self::InvalidCharacter => "Invalid Character",
        })
    }
}

/// A malformed token skipped by panic-mode recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Line#: {line} - Lexical Error: {kind} - {text}")]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    /// 1-based line number.
    pub line: usize,
    /// The full malformed span.
    pub span: Span,
    /// The skipped characters.
    pub text: String,
}

/// Errors raised by the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymTabError {
    #[error("Table full. Cannot add {category} {name:?} (capacity {capacity})")]
    TableFull {
        name: String,
        category: Category,
        capacity: usize,
    },
}

/// Non-fatal findings of a scanner pass, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanDiagnostic {
    #[error(transparent)]
    Lexical(#[from] LexicalError),

    #[error("Line#: {line} - {error}")]
    TableFull {
        line: usize,
        /// Column of the token that did not fit.
        column: usize,
        error: SymTabError,
    },
}

impl ScanDiagnostic {
    pub fn line(&self) -> usize {
        match self {
            Self::Lexical(e) => e.line,
            Self::TableFull { line, .. } => *line,
        }
    }

    /// Column where the offending text starts.
    pub fn column(&self) -> usize {
        match self {
            Self::Lexical(e) => e.span.start.column,
            Self::TableFull { column, .. } => *column,
        }
    }
}

/// Rule lookup miss: `stack_top` has no rule firing on `lookahead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no rule for {stack_top} on {lookahead:?}")]
pub struct NoApplicableRule {
    pub stack_top: Code,
    pub lookahead: Option<Code>,
}

/// Why a single PDA step could not be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    #[error(transparent)]
    NoRule(#[from] NoApplicableRule),

    #[error("parser stack is empty")]
    EmptyStack,

    #[error("parser already halted in state {0:?}")]
    Halted(ParserState),
}

/// Fatal parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No rule of the stack-top symbol fires on the current lookahead.
    #[error(
        "Line#: {line} - Syntax Error: no rule for {stack_top_name} on {}",
        .lexeme.as_deref().unwrap_or("end of input")
    )]
    NoApplicableRule {
        stack_top: Code,
        stack_top_name: String,
        /// `None` once the token queue is exhausted.
        lookahead: Option<Code>,
        lexeme: Option<String>,
        line: usize,
        /// Lookahead codes that would have been accepted.
        expected: Vec<Code>,
    },

    /// A queued lexeme is neither in the symbol table, the catalog, nor a
    /// scanned identifier or constant.
    #[error("Line#: {line} - cannot classify lookahead {lexeme:?}")]
    UnknownLookahead { lexeme: String, line: usize },

    #[error("Line#: {line} - Syntax Error: unexpected {lexeme:?} after end of program")]
    TrailingInput { lexeme: String, line: usize },

    #[error("parser exceeded its budget of {steps} steps")]
    StepBudgetExceeded { steps: usize },

    #[error("parser stack is empty")]
    EmptyStack,

    #[error("parser already halted in state {0:?}")]
    Halted(ParserState),
}

impl ParseError {
    /// Source line the error refers to, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::NoApplicableRule { line, .. }
            | Self::UnknownLookahead { line, .. }
            | Self::TrailingInput { line, .. } => Some(*line),
            Self::StepBudgetExceeded { .. } | Self::EmptyStack | Self::Halted(_) => None,
        }
    }
}

/// Failures while constructing the compiler front end.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("symbol catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("rule table: {0}")]
    Grammar(#[from] GrammarError),

    #[error("scanner: {0}")]
    Automaton(#[from] AutomatonError),
}
