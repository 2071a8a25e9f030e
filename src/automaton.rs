//! Scanner automata.
//!
//! Each scan mode is backed by one anchored dense DFA from `regex-automata`
//! built over all patterns of that mode. The lexer walks it one character at
//! a time and asks, after every step, whether the buffered text is a
//! completed token, a viable prefix of one, or dead.

use crate::codes::{Code, SymbolCatalog};
use crate::error::AutomatonError;
use regex_automata::{
    Anchored, Input, MatchKind,
    dfa::{Automaton, StartKind, dense},
    util::primitives::StateID,
};
use smartstring::alias::String;

/// Marker keyword that turns the rest of a line into a comment.
pub const COMMENT_KEYWORD: &str = "BTW";

pub const IDENTIFIER_PATTERN: &str = r"[a-z][a-z0-9_]*";
pub const CONSTANT_PATTERN: &str = r"[0-9]+(?:\.[0-9]+)?|\.[0-9]+";
pub const SPECIAL_PATTERN: &str = r";";

/// Token class the lexer is currently assembling; chosen by the first
/// character of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanMode {
    Keyword,
    Identifier,
    Constant,
    Special,
}

impl ScanMode {
    /// Mode opened by `ch`, or `None` for whitespace and unknown characters.
    pub fn for_start(ch: char) -> Option<Self> {
        match ch {
            'A'..='Z' => Some(Self::Keyword),
            'a'..='z' => Some(Self::Identifier),
            '0'..='9' | '.' => Some(Self::Constant),
            ';' => Some(Self::Special),
            _ => None,
        }
    }
}

impl From<ScanMode> for usize {
    fn from(mode: ScanMode) -> Self {
        mode as usize
    }
}

/// Result of classifying a buffered prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not yet a token but may still become one.
    Prefix,
    /// A complete token; the index is the matching pattern.
    Complete(usize),
    /// No continuation can produce a token.
    Dead,
}

/// One DFA and the labels of its patterns.
#[derive(Debug, Clone)]
pub struct ModeAutomaton {
    dfa: dense::DFA<Vec<u32>>,
    start: StateID,
    labels: Vec<String>,
}

impl ModeAutomaton {
    /// Compiles `patterns`; `labels[i]` names pattern `i`.
    pub fn new<P: AsRef<str>>(patterns: &[P], labels: Vec<String>) -> Result<Self, AutomatonError> {
        let dfa = dense::Builder::new()
            .configure(
                dense::DFA::config()
                    .match_kind(MatchKind::All)
                    .start_kind(StartKind::Anchored),
            )
            .build_many(patterns)?;
        let start = dfa.start_state_forward(&Input::new(&[]).anchored(Anchored::Yes))?;
        log::trace!(
            "automaton built: {} patterns, {} bytes",
            dfa.pattern_len(),
            dfa.memory_usage()
        );
        Ok(Self { dfa, start, labels })
    }

    #[inline]
    pub fn start(&self) -> StateID {
        self.start
    }

    /// Feeds the UTF-8 bytes of `ch`.
    pub fn advance(&self, mut state: StateID, ch: char) -> StateID {
        let mut buf = [0u8; 4];
        for &b in ch.encode_utf8(&mut buf).as_bytes() {
            state = self.dfa.next_state(state, b);
        }
        state
    }

    /// Classifies the text that led to `state`.
    pub fn verdict(&self, state: StateID) -> Verdict {
        if self.dfa.is_dead_state(state) {
            return Verdict::Dead;
        }
        let eoi = self.dfa.next_eoi_state(state);
        if self.dfa.is_match_state(eoi) {
            return Verdict::Complete(self.dfa.match_pattern(eoi, 0).as_usize());
        }
        // Matches are reported one byte late, so a state that only carries a
        // finished match of a shorter prefix is not dead yet; probe for any
        // live continuation.
        let live = (0..=u8::MAX).any(|b| !self.dfa.is_dead_state(self.dfa.next_state(state, b)));
        if live { Verdict::Prefix } else { Verdict::Dead }
    }

    /// Walks `text` from the start state and classifies it.
    pub fn classify(&self, text: &str) -> Verdict {
        let mut state = self.start;
        for ch in text.chars() {
            state = self.advance(state, ch);
            if self.dfa.is_dead_state(state) {
                return Verdict::Dead;
            }
        }
        self.verdict(state)
    }

    pub fn label(&self, pattern: usize) -> Option<&str> {
        self.labels.get(pattern).map(String::as_str)
    }

    pub fn pattern_count(&self) -> usize {
        self.labels.len()
    }
}

/// The four mode automata of the scanner.
#[derive(Debug, Clone)]
pub struct Automata {
    modes: [ModeAutomaton; 4],
}

impl Automata {
    /// Builds the automata; keyword patterns come from the literal terminals
    /// of `catalog` plus [`COMMENT_KEYWORD`].
    pub fn new(catalog: &SymbolCatalog) -> Result<Self, AutomatonError> {
        let mut keywords: Vec<String> = catalog
            .iter()
            .filter(|&(code, _)| code.is_literal() && code != Code::SEPARATOR)
            .map(|(_, name)| name.into())
            .collect();
        keywords.push(COMMENT_KEYWORD.into());
        let patterns: Vec<std::string::String> =
            keywords.iter().map(|k| regex::escape(k)).collect();

        Ok(Self {
            modes: [
                ModeAutomaton::new(patterns.as_slice(), keywords)?,
                ModeAutomaton::new(&[IDENTIFIER_PATTERN], vec!["[id]".into()])?,
                ModeAutomaton::new(&[CONSTANT_PATTERN], vec!["[const]".into()])?,
                ModeAutomaton::new(&[SPECIAL_PATTERN], vec![";".into()])?,
            ],
        })
    }

    #[inline]
    pub fn get(&self, mode: ScanMode) -> &ModeAutomaton {
        &self.modes[usize::from(mode)]
    }
}
