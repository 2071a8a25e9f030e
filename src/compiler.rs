//! # Compiler front end
//!
//! [`Frontend`] is the context object built once per process: the symbol
//! catalog, the rule table and the scanner automata. [`Frontend::compile`]
//! runs the two phases strictly in sequence, a complete scanner pass over
//! every line and then the PDA over the resulting token queue, and collects
//! everything into a [`Compilation`].
//!
//! ```rust
//! # use minilol::{Frontend, Options};
//! let frontend = Frontend::try_new().unwrap();
//! let out = frontend.compile(["HAI", "VISIBLE 5", "KTHXBYE"], &Options::default());
//! assert!(out.accepted());
//! assert_eq!(out.symtab.len(), 1);
//! ```

use crate::automaton::Automata;
use crate::codes::SymbolCatalog;
use crate::error::{ParseError, ScanDiagnostic, SetupError};
use crate::grammar::Rules;
use crate::lexer::{Finding, LexerStats, Scanner};
use crate::parser::{DEFAULT_STEP_BUDGET, ParseSummary, Parser, ParserStats, ParserStep};
use crate::symtab::{DEFAULT_CAPACITY, SymEntry, SymTab};
use crate::token::Token;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

/// Output switches and limits for one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Echo the source lines.
    pub print_input: bool,
    /// Print every scanner finding.
    pub scanner_findings: bool,
    /// Print one line per PDA step.
    pub parser_trace: bool,
    /// Print symbol-table additions as they happen.
    pub print_additions: bool,
    pub print_symtab: bool,
    pub symtab_capacity: usize,
    pub step_budget: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            print_input: true,
            scanner_findings: false,
            parser_trace: true,
            print_additions: false,
            print_symtab: true,
            symtab_capacity: DEFAULT_CAPACITY,
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }
}

/// Everything one compilation produced.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Scanned tokens in source order.
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<ScanDiagnostic>,
    pub findings: Vec<Finding>,
    pub additions: Vec<SymEntry>,
    pub symtab: SymTab,
    pub outcome: Result<ParseSummary, ParseError>,
    pub trace: Vec<ParserStep>,
    /// Tokens matched by the parser, in consumption order.
    pub consumed: Vec<Token>,
    pub lexer_stats: LexerStats,
    pub parser_stats: ParserStats,
}

impl Compilation {
    pub fn accepted(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Lexemes of the scanned tokens.
    pub fn lexemes(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.lexeme.as_str()).collect()
    }

    /// Renders the compiler listing for `lines` as selected by `options`.
    pub fn report<S: AsRef<str>>(&self, lines: &[S], options: &Options) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_report(&mut out, lines, options);
        out
    }

    fn write_report<S: AsRef<str>>(
        &self,
        out: &mut String,
        lines: &[S],
        options: &Options,
    ) -> std::fmt::Result {
        writeln!(out, "COMPILER OUTPUT:")?;
        writeln!(out)?;

        if options.print_input {
            writeln!(out, "Input File:")?;
            for line in lines {
                writeln!(out, "{}", line.as_ref())?;
            }
            writeln!(out)?;
        }

        // scanner output, merged in source order
        let mut scan: Vec<((usize, usize), String)> = Vec::new();
        if options.scanner_findings {
            scan.extend(
                self.findings
                    .iter()
                    .map(|f| ((f.line, f.column), f.to_string())),
            );
        }
        scan.extend(
            self.diagnostics
                .iter()
                .map(|d| ((d.line(), d.column()), d.to_string())),
        );
        scan.sort_by_key(|(at, _)| *at);
        for (_, text) in &scan {
            writeln!(out, "{text}")?;
        }
        if options.print_additions {
            for entry in &self.additions {
                writeln!(out, "{} added: {}", entry.category, entry.name)?;
            }
        }

        if options.parser_trace {
            for step in &self.trace {
                writeln!(out, "{step}")?;
            }
        }
        if let Err(err) = &self.outcome {
            writeln!(out, "{err}")?;
        }

        if options.print_symtab {
            writeln!(out)?;
            write!(out, "{}", self.symtab)?;
        }
        Ok(())
    }
}

/// Catalog, rule table and scanner automata.
#[derive(Debug, Clone)]
pub struct Frontend {
    catalog: SymbolCatalog,
    rules: Rules,
    automata: Automata,
}

impl Frontend {
    pub fn try_new() -> Result<Self, SetupError> {
        let catalog = SymbolCatalog::standard()?;
        let rules = Rules::standard(&catalog)?;
        let automata = Automata::new(&catalog)?;
        log::debug!(
            "frontend ready: {} symbols, {} rules",
            catalog.len(),
            rules.len()
        );
        Ok(Self {
            catalog,
            rules,
            automata,
        })
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn automata(&self) -> &Automata {
        &self.automata
    }

    /// Scans all `lines`, then parses the token queue.
    pub fn compile<I, S>(&self, lines: I, options: &Options) -> Compilation
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symtab = SymTab::with_capacity(options.symtab_capacity);
        let report = Scanner::new(&self.automata).scan(lines, &mut symtab);
        let tokens: Vec<Token> = report.tokens.iter().cloned().collect();

        let mut parser = Parser::new(&self.catalog, &self.rules, &symtab, report.tokens)
            .with_step_budget(options.step_budget);
        let outcome = parser.run();
        if let Err(err) = &outcome {
            log::info!("parse rejected: {}", err);
        }
        let trace = parser.trace().to_vec();
        let consumed = parser.consumed().to_vec();
        let parser_stats = parser.stats();

        Compilation {
            tokens,
            diagnostics: report.diagnostics,
            findings: report.findings,
            additions: report.additions,
            symtab,
            outcome,
            trace,
            consumed,
            lexer_stats: report.stats,
            parser_stats,
        }
    }
}

/// Reads `path` as a list of lines; empty lines are kept so line numbers
/// stay faithful.
pub fn load_lines(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text.lines().map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LexicalErrorKind, SymTabError};
    use crate::symtab::Category;
    use crate::token::TokenKind;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn compile(lines: &[&str]) -> Compilation {
        init_logger();
        let frontend = Frontend::try_new().unwrap();
        frontend.compile(lines, &Options::default())
    }

    fn assert_accepts(lines: &[&str]) -> Compilation {
        let out = compile(lines);
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        assert!(out.accepted(), "{:?}", out.outcome);
        // round trip: every scanned token is consumed, in order
        assert_eq!(out.consumed, out.tokens);
        out
    }

    #[test]
    fn scenario_hello() {
        let out = assert_accepts(&["HAI", "VISIBLE 5", "KTHXBYE"]);
        assert_eq!(out.lexemes(), ["HAI", "VISIBLE", "5", "KTHXBYE"]);
        assert_eq!(out.tokens[2].kind, TokenKind::Constant);
        let entries: Vec<std::string::String> =
            out.symtab.entries().map(|e| e.to_string()).collect();
        assert_eq!(entries, ["5, constant"]);
    }

    #[test]
    fn scenario_declaration() {
        let out = assert_accepts(&["HAI", "I HAS A x ITZ A NUMBR", "KTHXBYE"]);
        assert!(out.symtab.exists("x", Category::Identifier));
        assert_eq!(out.symtab.len(), 1);
    }

    #[test]
    fn scenario_invalid_keyword() {
        let out = compile(&["HAI", "VIZIBLE 5", "KTHXBYE"]);
        assert_eq!(out.lexemes(), ["HAI", "5", "KTHXBYE"]);
        let [ScanDiagnostic::Lexical(err)] = &out.diagnostics[..] else {
            panic!("expected one lexical error, got {:?}", out.diagnostics);
        };
        assert_eq!(err.kind, LexicalErrorKind::InvalidKeyword);
        assert_eq!(err.text.as_str(), "VIZIBLE");
        assert_eq!(err.line, 2);
        // the stray constant cannot start a statement
        assert!(matches!(
            out.outcome,
            Err(ParseError::NoApplicableRule { line: 2, .. })
        ));
    }

    #[test]
    fn scenario_missing_close() {
        let out = compile(&["HAI", "VISIBLE 5"]);
        let Err(ParseError::NoApplicableRule {
            lookahead,
            expected,
            ..
        }) = &out.outcome
        else {
            panic!("unexpected {:?}", out.outcome);
        };
        assert_eq!(*lookahead, None);
        let kthxbye = Frontend::try_new()
            .unwrap()
            .catalog()
            .code_of("KTHXBYE")
            .unwrap();
        assert!(expected.contains(&kthxbye));
        // the table is still reported
        assert!(out.symtab.exists("5", Category::Constant));
    }

    #[test]
    fn loops_and_arithmetic() {
        assert_accepts(&[
            "HAI",
            "I HAS A i ITZ A NUMBR",
            "i R 0",
            "IM IN YR loop WILE DIFFRINT i AN 10",
            "  VISIBLE i",
            "  i R SUM OF i AN PRODUKT OF 2 AN QUOSHUNT OF i AN 1.5",
            "IM OUTTA YR loop",
            "KTHXBYE",
        ]);
    }

    #[test]
    fn conditionals_and_booleans() {
        assert_accepts(&[
            "HAI",
            "GIMMEH x",
            "O RLY? BOTH SAEM x AN 5",
            "YA RLY",
            "  VISIBLE WIN",
            "NO WAI",
            "  VISIBLE NOT EITHER OF FAIL AN BOTH OF WIN AN WIN",
            "OIC",
            "KTHXBYE",
        ]);
    }

    #[test]
    fn switch_with_cases() {
        let out = assert_accepts(&[
            "HAI",
            "WTF? x",
            "OMG 1",
            "  VISIBLE 1",
            "  GTFO",
            "OMG WIN",
            "OMG 2",
            "  VISIBLE DIFF OF x AN 2",
            "OIC",
            "KTHXBYE",
        ]);
        assert_eq!(out.symtab.len(), 3);
    }

    #[test]
    fn functions_and_calls() {
        assert_accepts(&[
            "HAI",
            "HOW IZ I add YR a YR b",
            "  FOUND YR SUM OF a AN b",
            "IF U SAY SO",
            "HOW IZ I nop",
            "IF U SAY SO",
            "I IZ add YR x YR y MKAY",
            "I IZ nop MKAY",
            "KTHXBYE",
        ]);
    }

    #[test]
    fn separators_and_comments() {
        let out = assert_accepts(&[
            "BTW a greeting",
            "HAI",
            "I HAS A x ITZ A TROOF; x R WIN; VISIBLE x BTW prints WIN",
            "",
            "KTHXBYE",
        ]);
        assert_eq!(out.lexer_stats.comments, 2);
        assert_eq!(out.tokens[0].line, 2);
        assert_eq!(out.tokens.last().unwrap().line, 5);
    }

    #[test]
    fn symbol_table_overflow_still_parses() {
        init_logger();
        let mut lines = vec!["HAI".to_owned()];
        for n in 0..101 {
            lines.push(format!("I HAS A v{n} ITZ A NUMBR"));
        }
        lines.push("KTHXBYE".to_owned());
        let frontend = Frontend::try_new().unwrap();
        let out = frontend.compile(&lines, &Options::default());

        assert_eq!(out.symtab.len(), 100);
        assert!(!out.symtab.exists("v100", Category::Identifier));
        assert!(out.symtab.exists("v99", Category::Identifier));
        let [ScanDiagnostic::TableFull {
            line,
            column,
            error,
        }] = &out.diagnostics[..]
        else {
            panic!("expected one overflow, got {:?}", out.diagnostics);
        };
        assert_eq!(*line, 102);
        assert_eq!(*column, 8);
        assert!(matches!(error, SymTabError::TableFull { name, .. } if name.as_str() == "v100"));
        assert!(out.accepted(), "{:?}", out.outcome);
    }

    #[test]
    fn repeated_names_are_registered_once() {
        let out = assert_accepts(&[
            "HAI",
            "I HAS A x ITZ A NUMBR",
            "x R 1",
            "x R SUM OF x AN 1",
            "VISIBLE x",
            "KTHXBYE",
        ]);
        let names: Vec<&str> = out.symtab.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["x", "1"]);
    }

    #[test]
    fn step_budget_is_enforced() {
        init_logger();
        let frontend = Frontend::try_new().unwrap();
        let options = Options {
            step_budget: 5,
            ..Options::default()
        };
        let out = frontend.compile(["HAI", "VISIBLE 5", "KTHXBYE"], &options);
        assert_eq!(
            out.outcome,
            Err(ParseError::StepBudgetExceeded { steps: 5 })
        );
        assert_eq!(out.parser_stats.steps, 5);
    }

    #[test]
    fn report_listing() {
        let lines = ["HAI", "VIZIBLE 5", "KTHXBYE"];
        let out = compile(&lines);
        let text = out.report(&lines[..], &Options::default());
        assert!(text.starts_with("COMPILER OUTPUT:\n\nInput File:\nHAI\nVIZIBLE 5\nKTHXBYE\n\n"));
        assert!(text.contains("Line#: 2 - Lexical Error: Invalid Keyword - VIZIBLE\n"));
        assert!(text.contains("Step: 1 Stacktop: 0 Lookahead: HAI Action: Push <lol> (42)\n"));
        assert!(text.contains("Syntax Error"));
        assert!(text.ends_with("\nSymbol Table:\n5, constant\n"));

        let quiet = Options {
            print_input: false,
            parser_trace: false,
            print_symtab: false,
            scanner_findings: true,
            print_additions: true,
            ..Options::default()
        };
        let text = out.report(&lines[..], &quiet);
        assert!(!text.contains("Input File:"));
        assert!(!text.contains("Step:"));
        assert!(!text.contains("Symbol Table:"));
        assert!(text.contains("Line#: 1 - Keyword found: - HAI\n"));
        assert!(text.contains("constant added: 5\n"));
    }

    #[test]
    fn report_lists_scanner_output_in_source_order() {
        let lines = ["HAI", "VIZIBLE 5", "KTHXBYE"];
        let out = compile(&lines);
        let options = Options {
            scanner_findings: true,
            parser_trace: false,
            ..Options::default()
        };
        let text = out.report(&lines[..], &options);
        let error = text
            .find("Line#: 2 - Lexical Error: Invalid Keyword - VIZIBLE\n")
            .unwrap();
        let constant = text.find("Line#: 2 - Constant found: - 5\n").unwrap();
        let keyword = text.find("Line#: 1 - Keyword found: - HAI\n").unwrap();
        assert!(keyword < error);
        assert!(error < constant, "{text}");
    }

    #[test]
    fn load_lines_keeps_empty_lines() {
        let path = std::env::temp_dir().join(format!("minilol-{}.lol", std::process::id()));
        std::fs::write(&path, "HAI\r\n\r\nVISIBLE 5\nKTHXBYE\n").unwrap();
        let lines = load_lines(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(lines, ["HAI", "", "VISIBLE 5", "KTHXBYE"]);
        assert!(load_lines(std::env::temp_dir().join("minilol-missing.lol")).is_err());
    }
}
