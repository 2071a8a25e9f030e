//! # minilol
//!
//! Front end for Mini-LOL, a small LOLCODE-flavoured teaching language: a
//! DFA scanner with panic-mode error recovery feeding a table-driven
//! pushdown-automaton parser.
//!
//! The pipeline is strictly sequential. [`Scanner`] consumes every source
//! line, filling the [`SymTab`] and a token queue; [`Parser`] then drives a
//! [`Pda`] over that queue using the predictive [`Rules`] table, in which every
//! grammar symbol is addressed by its [`Code`] from the [`SymbolCatalog`].
//! [`Frontend`] bundles the immutable tables and runs both phases.
//!
//! ```rust
//! use minilol::{Frontend, Options};
//!
//! let frontend = Frontend::try_new()?;
//! let out = frontend.compile(["HAI", "I HAS A x ITZ A NUMBR", "KTHXBYE"], &Options::default());
//! assert!(out.accepted());
//! assert_eq!(out.lexemes(), ["HAI", "I HAS A", "x", "ITZ A", "NUMBR", "KTHXBYE"]);
//! # Ok::<(), minilol::SetupError>(())
//! ```

pub mod automaton;
pub mod codes;
pub mod compiler;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod symtab;
pub mod token;

pub use crate::automaton::{Automata, ModeAutomaton, ScanMode, Verdict};
pub use crate::codes::{Code, SYMBOL_COUNT, SYMBOLS, SymbolCatalog};
pub use crate::compiler::{Compilation, Frontend, Options, load_lines};
pub use crate::error::{
    AutomatonError, CatalogError, GrammarError, LexicalError, LexicalErrorKind, LookupError,
    NoApplicableRule, ParseError, Position, ScanDiagnostic, SetupError, Span, StepError,
    SymTabError,
};
pub use crate::grammar::{GRAMMAR, Production, Rule, RuleSpec, RuleTag, Rules};
pub use crate::lexer::{Finding, FindingKind, LexerStats, ScanReport, Scanner, Status};
pub use crate::parser::{
    ParseSummary, Parser, ParserState, ParserStats, ParserStep, Pda, StepAction,
};
pub use crate::symtab::{Category, SymEntry, SymTab};
pub use crate::token::{Token, TokenKind};
