//! # Lexical Scanner
//!
//! Line-oriented scanner driving the per-mode automata of
//! [`crate::automaton`]. Every token is assembled in one [`ScanMode`],
//! chosen by its first character; each further character is one
//! [`Scanner::step`] returning a [`Status`]:
//!
//! - [`Status::More`]: the buffer is a viable prefix, keep going;
//! - [`Status::Done`]: the buffer is a complete token and the next character
//!   is a separator (ASCII whitespace or `;`) or the end of the line;
//! - [`Status::Comment`]: `BTW` was buffered; the rest of the line is dropped;
//! - [`Status::Invalid`]: the character extends no valid spelling.
//!
//! On `Invalid` the scanner enters panic mode: it skips to the next separator
//! on the same line, reports the skipped span as one [`LexicalError`] and
//! resumes there. Tokens never cross a line boundary.
//!
//! Completed identifiers and constants are recorded in the [`SymTab`]; every
//! completed token is queued, in source order, for the parser.

use crate::automaton::{Automata, COMMENT_KEYWORD, ScanMode, Verdict};
use crate::error::{LexicalError, LexicalErrorKind, ScanDiagnostic, Span};
use crate::symtab::{SymEntry, SymTab};
use crate::token::{Token, TokenKind};
use regex_automata::util::primitives::StateID;
use smartstring::alias::String;
use std::collections::VecDeque;
use std::fmt;

/// Outcome of feeding one character to the current mode automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    More,
    Done,
    Comment,
    Invalid,
}

/// Characters that end a token.
#[inline]
pub fn is_separator(ch: char) -> bool {
    ch.is_ascii_whitespace() || ch == ';'
}

impl ScanMode {
    pub fn token_kind(self) -> TokenKind {
        match self {
            ScanMode::Keyword => TokenKind::Keyword,
            ScanMode::Identifier => TokenKind::Identifier,
            ScanMode::Constant => TokenKind::Constant,
            ScanMode::Special => TokenKind::SpecialSymbol,
        }
    }

    pub fn error_kind(self) -> LexicalErrorKind {
        match self {
            ScanMode::Keyword => LexicalErrorKind::InvalidKeyword,
            ScanMode::Identifier => LexicalErrorKind::InvalidIdentifier,
            ScanMode::Constant => LexicalErrorKind::InvalidConstant,
            ScanMode::Special => LexicalErrorKind::InvalidCharacter,
        }
    }
}

/// What a scan trace line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    Token(TokenKind),
    Comment,
}

/// One "found" record of the scan trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub line: usize,
    /// Character offset of the first character on the line.
    pub column: usize,
    pub kind: FindingKind,
    pub lexeme: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what: &dyn fmt::Display = match &self.kind {
            FindingKind::Token(kind) => kind,
            FindingKind::Comment => &"Comment",
        };
        write!(f, "Line#: {} - {} found: - {}", self.line, what, self.lexeme)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexerStats {
    pub lines: usize,
    pub chars: usize,
    pub tokens: usize,
    pub comments: usize,
    pub errors: usize,
}

/// Everything one scanner pass produces.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Completed tokens in source order.
    pub tokens: VecDeque<Token>,
    /// Lexical errors and table overflows in source order.
    pub diagnostics: Vec<ScanDiagnostic>,
    pub findings: Vec<Finding>,
    /// Symbol-table entries added by this pass.
    pub additions: Vec<SymEntry>,
    pub stats: LexerStats,
}

/// The DFA scanner. Holds no per-pass state; see [`Scanner::scan`].
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    automata: &'a Automata,
}

impl<'a> Scanner<'a> {
    pub fn new(automata: &'a Automata) -> Self {
        Self { automata }
    }

    /// Advances `state` of `mode` by `ch`; `next` is the character after
    /// `ch` on the same line, if any.
    pub fn step(
        &self,
        mode: ScanMode,
        state: StateID,
        ch: char,
        next: Option<char>,
    ) -> (StateID, Status) {
        let automaton = self.automata.get(mode);
        let state = automaton.advance(state, ch);
        let status = match automaton.verdict(state) {
            Verdict::Dead => Status::Invalid,
            Verdict::Prefix => Status::More,
            Verdict::Complete(pattern) => {
                if mode == ScanMode::Keyword && automaton.label(pattern) == Some(COMMENT_KEYWORD) {
                    Status::Comment
                } else if mode == ScanMode::Special || next.is_none_or(is_separator) {
                    Status::Done
                } else {
                    Status::More
                }
            }
        };
        log::trace!(
            "STEP: mode={:?}, ch={:?}, next={:?}, s={}, status={:?}",
            mode,
            ch,
            next,
            state.as_usize(),
            status
        );
        (state, status)
    }

    /// Scans all `lines` (line numbers start at 1).
    pub fn scan<I, S>(&self, lines: I, symtab: &mut SymTab) -> ScanReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ScanReport::default();
        for (idx, line) in lines.into_iter().enumerate() {
            self.scan_line(idx + 1, line.as_ref(), symtab, &mut report);
        }
        log::debug!("scan finished: {:?}", report.stats);
        report
    }

    /// Scans one physical line into `report`.
    pub fn scan_line(
        &self,
        line_no: usize,
        line: &str,
        symtab: &mut SymTab,
        report: &mut ScanReport,
    ) {
        let chars: Vec<char> = line.chars().collect();
        report.stats.lines += 1;
        report.stats.chars += chars.len();

        let mut pos = 0;
        while pos < chars.len() {
            let ch = chars[pos];
            if ch.is_ascii_whitespace() {
                pos += 1;
                continue;
            }
            pos = match ScanMode::for_start(ch) {
                Some(mode) => self.scan_token(mode, line_no, &chars, pos, symtab, report),
                None => {
                    let end = recovery_end(&chars, pos + 1);
                    lexical_error(
                        report,
                        LexicalErrorKind::InvalidCharacter,
                        line_no,
                        &chars,
                        pos,
                        end,
                    );
                    end
                }
            };
        }
    }

    /// Assembles one token starting at `start`; returns where scanning
    /// resumes.
    fn scan_token(
        &self,
        mode: ScanMode,
        line_no: usize,
        chars: &[char],
        start: usize,
        symtab: &mut SymTab,
        report: &mut ScanReport,
    ) -> usize {
        let mut state = self.automata.get(mode).start();
        let mut pos = start;
        loop {
            let ch = chars[pos];
            let (next_state, status) = self.step(mode, state, ch, chars.get(pos + 1).copied());
            state = next_state;
            match status {
                Status::More => {
                    pos += 1;
                    if pos == chars.len() {
                        // line ended inside a token
                        lexical_error(report, mode.error_kind(), line_no, chars, start, pos);
                        return pos;
                    }
                }
                Status::Done => {
                    complete(mode, line_no, chars, start, pos + 1, symtab, report);
                    return pos + 1;
                }
                Status::Comment => {
                    let lexeme: String = chars[start..=pos].iter().copied().collect();
                    log::debug!("Line#: {} - Comment found: - {}", line_no, lexeme);
                    report.stats.comments += 1;
                    report.findings.push(Finding {
                        line: line_no,
                        column: start,
                        kind: FindingKind::Comment,
                        lexeme,
                    });
                    return chars.len();
                }
                Status::Invalid => {
                    let end = if is_separator(ch) {
                        pos
                    } else {
                        recovery_end(chars, pos + 1)
                    };
                    lexical_error(report, mode.error_kind(), line_no, chars, start, end);
                    return end;
                }
            }
        }
    }
}

/// Index of the first separator at or after `from`, or the line length.
fn recovery_end(chars: &[char], from: usize) -> usize {
    chars[from.min(chars.len())..]
        .iter()
        .position(|&c| is_separator(c))
        .map_or(chars.len(), |off| from + off)
}

fn lexical_error(
    report: &mut ScanReport,
    kind: LexicalErrorKind,
    line: usize,
    chars: &[char],
    start: usize,
    end: usize,
) {
    // a buffered multi-word prefix may end in whitespace
    let mut end = end;
    while end > start + 1 && is_separator(chars[end - 1]) {
        end -= 1;
    }
    let err = LexicalError {
        kind,
        line,
        span: Span::on_line(line, start, end - start),
        text: chars[start..end].iter().copied().collect(),
    };
    log::warn!("{}", err);
    report.stats.errors += 1;
    report.diagnostics.push(err.into());
}

fn complete(
    mode: ScanMode,
    line: usize,
    chars: &[char],
    start: usize,
    end: usize,
    symtab: &mut SymTab,
    report: &mut ScanReport,
) {
    let lexeme: String = chars[start..end].iter().copied().collect();
    let kind = mode.token_kind();
    log::debug!("Line#: {} - {} found: - {}", line, kind, lexeme);

    if let Some(category) = kind.category() {
        if !symtab.exists(&lexeme, category) {
            match symtab.insert(&lexeme, category) {
                Ok(()) => report.additions.push(SymEntry {
                    name: lexeme.clone(),
                    category,
                }),
                Err(error) => {
                    log::warn!("Line#: {} - {}", line, error);
                    report.stats.errors += 1;
                    report
                        .diagnostics
                        .push(ScanDiagnostic::TableFull {
                            line,
                            column: start,
                            error,
                        });
                }
            }
        }
    }

    report.stats.tokens += 1;
    report.findings.push(Finding {
        line,
        column: start,
        kind: FindingKind::Token(kind),
        lexeme: lexeme.clone(),
    });
    report.tokens.push_back(Token {
        kind,
        lexeme,
        line,
        span: Span::on_line(line, start, end - start),
    });
}
