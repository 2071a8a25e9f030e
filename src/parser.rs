//! # PDA Parser
//!
//! Table-driven predictive parsing with an explicit pushdown automaton.
//!
//! [`Pda`] is a plain value: the machine state plus the symbol stack.
//! [`Pda::step`] is pure; it maps `(pda, lookahead)` to the next `pda` and
//! the [`StepAction`] taken, which makes single steps testable in isolation.
//!
//! [`Parser`] drives a `Pda` over the scanner's token queue. Before every step
//! it resolves the front token into a lookahead code, and on a terminal match
//! it dequeues that token into the consumed list. Each step is recorded as a
//! [`ParserStep`] whose `Display` is the familiar one-line trace.
//!
//! The drive loop:
//! 1. stack top is the start marker `Z_o`: in `Initial` push `<lol>` and go
//!    to `Working`; in `Working` the program is reduced, so `Accept`;
//! 2. otherwise resolve the unique rule for `(top, lookahead)`; no rule is a
//!    [`ParseError::NoApplicableRule`];
//! 3. pop the top; push an expansion in reverse so its first symbol ends on
//!    top; a match rule consumes the front token.

use crate::codes::{Code, SymbolCatalog};
use crate::error::{ParseError, StepError};
use crate::grammar::{Production, RuleTag, Rules};
use crate::symtab::{Category, SymTab};
use crate::token::Token;
use smartstring::alias::String;
use std::collections::VecDeque;
use std::fmt;

/// Default limit on PDA steps for one parse.
pub const DEFAULT_STEP_BUDGET: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    Initial,
    Working,
    Accept,
    Error,
}

/// What one PDA step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Start marker seen first: `<lol>` pushed.
    Begin,
    Expand { tag: RuleTag, push: Vec<Code> },
    Epsilon(RuleTag),
    /// Terminal popped and the front token consumed.
    Match(Code),
    Accept,
}

/// The pushdown automaton: state plus symbol stack, `Z_o` at the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pda {
    state: ParserState,
    stack: Vec<Code>,
}

impl Default for Pda {
    fn default() -> Self {
        Self::new()
    }
}

impl Pda {
    pub fn new() -> Self {
        Self {
            state: ParserState::Initial,
            stack: vec![Code::START],
        }
    }

    #[inline]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Bottom first.
    #[inline]
    pub fn stack(&self) -> &[Code] {
        &self.stack
    }

    #[inline]
    pub fn top(&self) -> Option<Code> {
        self.stack.last().copied()
    }

    /// Takes one step on `lookahead` (`None` once input is exhausted).
    ///
    /// `self` is left untouched; the successor is returned together with the
    /// action taken.
    pub fn step(
        &self,
        rules: &Rules,
        lookahead: Option<Code>,
    ) -> Result<(Pda, StepAction), StepError> {
        if matches!(self.state, ParserState::Accept | ParserState::Error) {
            return Err(StepError::Halted(self.state));
        }
        let top = self.top().ok_or(StepError::EmptyStack)?;
        let mut next = self.clone();

        if top.is_start() {
            let action = match self.state {
                ParserState::Initial => {
                    next.stack.push(Code::LOL);
                    next.state = ParserState::Working;
                    StepAction::Begin
                }
                _ => {
                    next.state = ParserState::Accept;
                    StepAction::Accept
                }
            };
            return Ok((next, action));
        }

        let rule = rules.resolve(top, lookahead)?;
        next.stack.pop();
        let action = match &rule.production {
            Production::Match => StepAction::Match(top),
            Production::Epsilon => StepAction::Epsilon(rule.tag),
            Production::Expand(push) => {
                next.stack.extend(push.iter().rev());
                StepAction::Expand {
                    tag: rule.tag,
                    push: push.clone(),
                }
            }
        };
        Ok((next, action))
    }

    fn fail(&mut self) {
        self.state = ParserState::Error;
    }
}

/// One entry of the parse trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserStep {
    /// 1-based step number.
    pub step: usize,
    pub stack_top: Code,
    pub lookahead: Option<Code>,
    pub lexeme: Option<String>,
    pub action: StepAction,
}

impl fmt::Display for ParserStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let la = self.lexeme.as_deref().unwrap_or("end of input");
        write!(
            f,
            "Step: {} Stacktop: {} Lookahead: {}",
            self.step, self.stack_top, la
        )?;
        match &self.action {
            StepAction::Begin => write!(f, " Action: Push <lol> ({})", Code::LOL),
            StepAction::Expand { tag, .. } => write!(f, " use rule: {tag}"),
            StepAction::Epsilon(tag) => write!(f, " use rule: {tag}"),
            StepAction::Match(code) => write!(f, " match {} ({})", la, code),
            StepAction::Accept => write!(f, " Action: Accept"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    pub steps: usize,
    pub expansions: usize,
    pub epsilons: usize,
    pub matches: usize,
}

/// Result of an accepted parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    pub steps: usize,
    pub consumed: usize,
}

/// Drives a [`Pda`] over a queue of scanned tokens.
pub struct Parser<'a> {
    catalog: &'a SymbolCatalog,
    rules: &'a Rules,
    symtab: &'a SymTab,
    tokens: VecDeque<Token>,
    pda: Pda,
    consumed: Vec<Token>,
    trace: Vec<ParserStep>,
    stats: ParserStats,
    step_budget: usize,
}

impl<'a> Parser<'a> {
    pub fn new(
        catalog: &'a SymbolCatalog,
        rules: &'a Rules,
        symtab: &'a SymTab,
        tokens: VecDeque<Token>,
    ) -> Self {
        Self {
            catalog,
            rules,
            symtab,
            tokens,
            pda: Pda::new(),
            consumed: Vec::new(),
            trace: Vec::new(),
            stats: ParserStats::default(),
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }

    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    #[inline]
    pub fn state(&self) -> ParserState {
        self.pda.state()
    }

    #[inline]
    pub fn pda(&self) -> &Pda {
        &self.pda
    }

    pub fn trace(&self) -> &[ParserStep] {
        &self.trace
    }

    /// Tokens matched so far, in consumption order.
    pub fn consumed(&self) -> &[Token] {
        &self.consumed
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> &VecDeque<Token> {
        &self.tokens
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Grammar code of `token`: a symbol-table identifier or constant first,
    /// then a literal terminal spelling, then the token's scanned class.
    pub fn resolve(&self, token: &Token) -> Result<Code, ParseError> {
        match self.symtab.category_of(&token.lexeme) {
            Some(Category::Identifier) => return Ok(Code::ID),
            Some(Category::Constant) => return Ok(Code::CONST),
            None => {}
        }
        if let Ok(code) = self.catalog.code_of(&token.lexeme) {
            if code.is_literal() {
                return Ok(code);
            }
        }
        match token.kind.category() {
            Some(Category::Identifier) => Ok(Code::ID),
            Some(Category::Constant) => Ok(Code::CONST),
            None => Err(ParseError::UnknownLookahead {
                lexeme: token.lexeme.clone(),
                line: token.line,
            }),
        }
    }

    /// Code of the front token, `None` when the queue is empty.
    pub fn lookahead(&self) -> Result<Option<Code>, ParseError> {
        self.tokens.front().map(|t| self.resolve(t)).transpose()
    }

    /// Line to blame when the queue is empty.
    fn current_line(&self) -> usize {
        self.tokens
            .front()
            .or(self.consumed.last())
            .map_or(0, |t| t.line)
    }

    /// Takes one PDA step and returns the resulting state.
    ///
    /// `Accept` and `Error` are final: stepping a finished parser returns
    /// [`ParseError::Halted`] and leaves its state unchanged.
    pub fn step(&mut self) -> Result<ParserState, ParseError> {
        match self.try_step() {
            Ok(state) => Ok(state),
            Err(err @ ParseError::Halted(_)) => Err(err),
            Err(err) => {
                log::warn!("{}", err);
                self.pda.fail();
                Err(err)
            }
        }
    }

    fn try_step(&mut self) -> Result<ParserState, ParseError> {
        if let state @ (ParserState::Accept | ParserState::Error) = self.pda.state() {
            return Err(ParseError::Halted(state));
        }
        if self.stats.steps >= self.step_budget {
            return Err(ParseError::StepBudgetExceeded {
                steps: self.stats.steps,
            });
        }
        let top = self.pda.top().ok_or(ParseError::EmptyStack)?;
        if top.is_start() && self.pda.state() == ParserState::Working {
            if let Some(extra) = self.tokens.front() {
                return Err(ParseError::TrailingInput {
                    lexeme: extra.lexeme.clone(),
                    line: extra.line,
                });
            }
        }

        let lookahead = self.lookahead()?;
        let (next, action) = match self.pda.step(self.rules, lookahead) {
            Ok(ok) => ok,
            Err(StepError::NoRule(miss)) => {
                return Err(ParseError::NoApplicableRule {
                    stack_top: miss.stack_top,
                    stack_top_name: self.catalog.display_name(miss.stack_top).into(),
                    lookahead: miss.lookahead,
                    lexeme: self.tokens.front().map(|t| t.lexeme.clone()),
                    line: self.current_line(),
                    expected: self.rules.expected(miss.stack_top).collect(),
                });
            }
            Err(StepError::EmptyStack) => return Err(ParseError::EmptyStack),
            Err(StepError::Halted(state)) => return Err(ParseError::Halted(state)),
        };

        self.stats.steps += 1;
        let lexeme = self.tokens.front().map(|t| t.lexeme.clone());
        match &action {
            StepAction::Expand { .. } => self.stats.expansions += 1,
            StepAction::Epsilon(_) => self.stats.epsilons += 1,
            StepAction::Match(_) => {
                self.stats.matches += 1;
                if let Some(token) = self.tokens.pop_front() {
                    self.consumed.push(token);
                }
            }
            StepAction::Begin | StepAction::Accept => {}
        }

        let record = ParserStep {
            step: self.stats.steps,
            stack_top: top,
            lookahead,
            lexeme,
            action,
        };
        log::trace!("{} stack={:?}", record, next.stack());
        self.trace.push(record);
        self.pda = next;
        Ok(self.pda.state())
    }

    /// Steps until `Accept` or the first error.
    pub fn run(&mut self) -> Result<ParseSummary, ParseError> {
        while self.step()? != ParserState::Accept {}
        log::debug!("parse accepted: {:?}", self.stats);
        Ok(ParseSummary {
            steps: self.stats.steps,
            consumed: self.consumed.len(),
        })
    }
}
