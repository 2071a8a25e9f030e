//! # Grammar Rule Table
//!
//! The Mini-LOL grammar, hand-compiled into one table of predictive rules.
//! For every stack symbol the table holds the rules that may rewrite it, each
//! with the set of lookahead codes on which it fires:
//!
//! - a terminal (`1..=41`) owns exactly one [`Production::Match`] rule whose
//!   lookahead set is `{code}`; resolving it re-validates that the token in
//!   front of the queue is the terminal the stack predicts;
//! - a non-terminal (`42..=64`) owns one or more [`Production::Expand`] or
//!   [`Production::Epsilon`] rules with pairwise disjoint lookahead sets.
//!
//! Disjointness is the determinism invariant of the PDA and is verified when
//! the table is built: [`Rules::new`] refuses a table where two rules of the
//! same non-terminal share a lookahead code.
//!
//! ```rust
//! # use minilol::{Code, Production, Rules, SymbolCatalog};
//! let catalog = SymbolCatalog::standard().unwrap();
//! let rules = Rules::standard(&catalog).unwrap();
//! let visible = catalog.code_of("VISIBLE").unwrap();
//! let stmt = catalog.code_of("<stmt>").unwrap();
//! let rule = rules.resolve(stmt, Some(visible)).unwrap();
//! assert_eq!(rule.tag.to_string(), "44 - b");
//! assert!(matches!(rule.production, Production::Expand(_)));
//! ```

use crate::codes::{Code, SymbolCatalog};
use crate::error::{GrammarError, NoApplicableRule};
use std::collections::BTreeSet;
use std::fmt;

/// Statements begin with one of these.
const STMT_START: &[&str] = &[
    "GIMMEH", "VISIBLE", "I HAS A", "[id]", "IM IN YR", "O RLY?", "WTF?", "FOUND YR", "GTFO",
    "HOW IZ I", "I IZ",
];

/// Keywords that close a statement block.
const BODY_END: &[&str] = &["KTHXBYE", "NO WAI", "IM OUTTA YR", "OIC", "OMG", "IF U SAY SO"];

/// Source form of one non-terminal rule, spelled with catalog names.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub owner: &'static str,
    pub sub: char,
    /// `None` marks an ε rule.
    pub push: Option<&'static [&'static str]>,
    pub lookahead: &'static [&'static str],
}

impl RuleSpec {
    pub const fn expand(
        owner: &'static str,
        sub: char,
        push: &'static [&'static str],
        lookahead: &'static [&'static str],
    ) -> Self {
        Self {
            owner,
            sub,
            push: Some(push),
            lookahead,
        }
    }

    pub const fn epsilon(
        owner: &'static str,
        sub: char,
        lookahead: &'static [&'static str],
    ) -> Self {
        Self {
            owner,
            sub,
            push: None,
            lookahead,
        }
    }
}

/// The Mini-LOL productions.
pub const GRAMMAR: &[RuleSpec] = &[
    RuleSpec::expand("<lol>", 'a', &["HAI", "<body>", "KTHXBYE"], &["HAI"]),
    // <body>
    RuleSpec::expand("<body>", 'a', &["<stmt>", "<body>"], STMT_START),
    RuleSpec::epsilon("<body>", 'b', BODY_END),
    RuleSpec::expand("<body>", 'c', &[";", "<body>"], &[";"]),
    // <stmt>
    RuleSpec::expand("<stmt>", 'a', &["<input>"], &["GIMMEH"]),
    RuleSpec::expand("<stmt>", 'b', &["<output>"], &["VISIBLE"]),
    RuleSpec::expand("<stmt>", 'c', &["<decl>"], &["I HAS A"]),
    RuleSpec::expand("<stmt>", 'd', &["<asmt>"], &["[id]"]),
    RuleSpec::expand("<stmt>", 'e', &["<loop>"], &["IM IN YR"]),
    RuleSpec::expand("<stmt>", 'f', &["<if>"], &["O RLY?"]),
    RuleSpec::expand("<stmt>", 'g', &["<case>"], &["WTF?"]),
    RuleSpec::expand("<stmt>", 'h', &["<return>"], &["FOUND YR", "GTFO"]),
    RuleSpec::expand("<stmt>", 'i', &["<function>"], &["HOW IZ I"]),
    RuleSpec::expand("<stmt>", 'j', &["<call>"], &["I IZ"]),
    // simple statements
    RuleSpec::expand("<input>", 'a', &["GIMMEH", "[id]"], &["GIMMEH"]),
    RuleSpec::expand("<output>", 'a', &["VISIBLE", "<expr>"], &["VISIBLE"]),
    RuleSpec::expand(
        "<decl>",
        'a',
        &["I HAS A", "[id]", "ITZ A", "<type>"],
        &["I HAS A"],
    ),
    RuleSpec::expand("<type>", 'a', &["NUMBR"], &["NUMBR"]),
    RuleSpec::expand("<type>", 'b', &["NUMBAR"], &["NUMBAR"]),
    RuleSpec::expand("<type>", 'c', &["TROOF"], &["TROOF"]),
    RuleSpec::expand("<asmt>", 'a', &["[id]", "R", "<expr>"], &["[id]"]),
    // blocks
    RuleSpec::expand(
        "<loop>",
        'a',
        &["IM IN YR", "[id]", "WILE", "<bool>", "<body>", "IM OUTTA YR", "[id]"],
        &["IM IN YR"],
    ),
    RuleSpec::expand(
        "<if>",
        'a',
        &["O RLY?", "<bool>", "YA RLY", "<body>", "NO WAI", "<body>", "OIC"],
        &["O RLY?"],
    ),
    RuleSpec::expand("<case>", 'a', &["WTF?", "<expr>", "<omgs>", "OIC"], &["WTF?"]),
    RuleSpec::expand("<omgs>", 'a', &["<omg>", "<omgs>"], &["OMG"]),
    RuleSpec::epsilon("<omgs>", 'b', &["OIC"]),
    RuleSpec::expand("<omg>", 'a', &["OMG", "<value>", "<body>"], &["OMG"]),
    RuleSpec::expand("<value>", 'a', &["[const]"], &["[const]"]),
    RuleSpec::expand("<value>", 'b', &["WIN"], &["WIN"]),
    RuleSpec::expand("<value>", 'c', &["FAIL"], &["FAIL"]),
    RuleSpec::expand("<return>", 'a', &["FOUND YR", "<expr>"], &["FOUND YR"]),
    RuleSpec::expand("<return>", 'b', &["GTFO"], &["GTFO"]),
    // functions
    RuleSpec::expand(
        "<function>",
        'a',
        &["HOW IZ I", "[id]", "<args>", "<body>", "IF U SAY SO"],
        &["HOW IZ I"],
    ),
    RuleSpec::expand("<args>", 'a', &["<arg>", "<args>"], &["YR"]),
    RuleSpec::epsilon(
        "<args>",
        'b',
        &[
            "IF U SAY SO",
            "MKAY",
            "GIMMEH",
            "VISIBLE",
            "I HAS A",
            "[id]",
            "IM IN YR",
            "O RLY?",
            "WTF?",
            "FOUND YR",
            "GTFO",
            "HOW IZ I",
            "I IZ",
            ";",
        ],
    ),
    RuleSpec::expand("<arg>", 'a', &["YR", "[id]"], &["YR"]),
    RuleSpec::expand("<call>", 'a', &["I IZ", "[id]", "<args>", "MKAY"], &["I IZ"]),
    // expressions
    RuleSpec::expand(
        "<expr>",
        'a',
        &["<arith>"],
        &["SUM OF", "DIFF OF", "PRODUKT OF", "QUOSHUNT OF", "[id]", "[const]"],
    ),
    RuleSpec::expand(
        "<expr>",
        'b',
        &["<bool>"],
        &["BOTH OF", "EITHER OF", "NOT", "BOTH SAEM", "DIFFRINT", "WIN", "FAIL"],
    ),
    RuleSpec::expand("<arith>", 'a', &["SUM OF", "<arith>", "AN", "<arith>"], &["SUM OF"]),
    RuleSpec::expand("<arith>", 'b', &["DIFF OF", "<arith>", "AN", "<arith>"], &["DIFF OF"]),
    RuleSpec::expand(
        "<arith>",
        'c',
        &["PRODUKT OF", "<arith>", "AN", "<arith>"],
        &["PRODUKT OF"],
    ),
    RuleSpec::expand(
        "<arith>",
        'd',
        &["QUOSHUNT OF", "<arith>", "AN", "<arith>"],
        &["QUOSHUNT OF"],
    ),
    RuleSpec::expand("<arith>", 'e', &["[id]"], &["[id]"]),
    RuleSpec::expand("<arith>", 'f', &["[const]"], &["[const]"]),
    RuleSpec::expand("<bool>", 'a', &["BOTH OF", "<bool>", "AN", "<bool>"], &["BOTH OF"]),
    RuleSpec::expand("<bool>", 'b', &["EITHER OF", "<bool>", "AN", "<bool>"], &["EITHER OF"]),
    RuleSpec::expand("<bool>", 'c', &["NOT", "<bool>"], &["NOT"]),
    RuleSpec::expand("<bool>", 'd', &["<comp>"], &["BOTH SAEM", "DIFFRINT"]),
    RuleSpec::expand("<bool>", 'e', &["WIN"], &["WIN"]),
    RuleSpec::expand("<bool>", 'f', &["FAIL"], &["FAIL"]),
    RuleSpec::expand("<comp>", 'a', &["BOTH SAEM", "<expr>", "AN", "<expr>"], &["BOTH SAEM"]),
    RuleSpec::expand("<comp>", 'b', &["DIFFRINT", "<expr>", "AN", "<expr>"], &["DIFFRINT"]),
];

/// Display identity of a rule: owning code plus a sub-id letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleTag {
    pub id: Code,
    pub sub: char,
}

impl fmt::Display for RuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.id, self.sub)
    }
}

/// What executing a rule does to the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Production {
    /// Terminal on top: pop it and consume the front token.
    Match,
    /// Replace the top with these symbols, first symbol ending on top.
    Expand(Vec<Code>),
    /// Pop the non-terminal without pushing anything.
    Epsilon,
}

/// One production for a stack-top symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub owner: Code,
    pub tag: RuleTag,
    pub production: Production,
    pub lookahead: BTreeSet<Code>,
}

impl Rule {
    #[inline]
    pub fn fires_on(&self, lookahead: Code) -> bool {
        self.lookahead.contains(&lookahead)
    }
}

/// The rule table, indexed by stack-top code.
#[derive(Debug, Clone)]
pub struct Rules {
    table: Vec<Vec<Rule>>,
    /// Union of the lookahead sets of each symbol's rules.
    expected: Vec<BTreeSet<Code>>,
}

impl Rules {
    /// Builds the Mini-LOL table from [`GRAMMAR`].
    pub fn standard(catalog: &SymbolCatalog) -> Result<Self, GrammarError> {
        Self::new(catalog, GRAMMAR)
    }

    /// Builds a table from non-terminal rule specs; every terminal gets its
    /// match rule automatically.
    pub fn new(catalog: &SymbolCatalog, specs: &[RuleSpec]) -> Result<Self, GrammarError> {
        let mut table: Vec<Vec<Rule>> = vec![Vec::new(); crate::codes::SYMBOL_COUNT];

        for code in Code::all().filter(|c| c.is_terminal()) {
            table[usize::from(code)].push(Rule {
                owner: code,
                tag: RuleTag { id: code, sub: 'a' },
                production: Production::Match,
                lookahead: BTreeSet::from([code]),
            });
        }

        for spec in specs {
            let owner = catalog.code_of(spec.owner)?;
            if !owner.is_nonterminal() {
                return Err(GrammarError::BadOwner(spec.owner.into()));
            }
            let production = match spec.push {
                Some(push) => Production::Expand(
                    push.iter()
                        .map(|name| catalog.code_of(name))
                        .collect::<Result<_, _>>()?,
                ),
                None => Production::Epsilon,
            };
            let lookahead = spec
                .lookahead
                .iter()
                .map(|name| catalog.code_of(name))
                .collect::<Result<BTreeSet<_>, _>>()?;
            table[usize::from(owner)].push(Rule {
                owner,
                tag: RuleTag {
                    id: owner,
                    sub: spec.sub,
                },
                production,
                lookahead,
            });
        }

        let expected = table
            .iter()
            .map(|rules| {
                rules
                    .iter()
                    .flat_map(|r| r.lookahead.iter().copied())
                    .collect()
            })
            .collect();

        let rules = Self { table, expected };
        rules.check(catalog)?;
        log::debug!(
            "rule table built: {} rules",
            rules.table.iter().map(Vec::len).sum::<usize>()
        );
        Ok(rules)
    }

    /// Verifies the table shape and the determinism invariant.
    pub fn check(&self, catalog: &SymbolCatalog) -> Result<(), GrammarError> {
        for code in Code::all().skip(1) {
            let rules = self.rules_for(code);
            if code.is_terminal() {
                let [rule] = rules else {
                    return Err(GrammarError::BadTerminal(catalog.display_name(code).into()));
                };
                if rule.production != Production::Match || rule.lookahead != BTreeSet::from([code])
                {
                    return Err(GrammarError::BadTerminal(catalog.display_name(code).into()));
                }
                continue;
            }
            if rules.is_empty() {
                return Err(GrammarError::NoRules(catalog.display_name(code).into()));
            }
            for (i, first) in rules.iter().enumerate() {
                for second in &rules[i + 1..] {
                    if let Some(&shared) = first.lookahead.intersection(&second.lookahead).next() {
                        return Err(GrammarError::Overlap {
                            owner: catalog.display_name(code).into(),
                            first: first.tag.to_string().into(),
                            second: second.tag.to_string().into(),
                            lookahead: catalog.display_name(shared).into(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Rules owned by `code`, in table order.
    pub fn rules_for(&self, code: Code) -> &[Rule] {
        self.table
            .get(usize::from(code))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every lookahead code on which some rule of `code` fires.
    pub fn expected(&self, code: Code) -> impl Iterator<Item = Code> + '_ {
        self.expected
            .get(usize::from(code))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Returns the unique rule of `top` that fires on `lookahead`.
    ///
    /// A `None` lookahead (exhausted input) never matches.
    pub fn resolve(
        &self,
        top: Code,
        lookahead: Option<Code>,
    ) -> Result<&Rule, NoApplicableRule> {
        let no_rule = NoApplicableRule {
            stack_top: top,
            lookahead,
        };
        let Some(la) = lookahead else {
            return Err(no_rule);
        };
        if top.is_terminal() {
            return match self.rules_for(top) {
                [rule] if rule.fires_on(la) => Ok(rule),
                _ => Err(no_rule),
            };
        }
        self.rules_for(top)
            .iter()
            .find(|rule| rule.fires_on(la))
            .ok_or(no_rule)
    }

    pub fn len(&self) -> usize {
        self.table.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All rules in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.table.iter().flatten()
    }

    /// Human-readable listing of the table.
    pub fn describe(&self, catalog: &SymbolCatalog) -> std::string::String {
        let mut out = std::string::String::new();
        for rule in self.iter() {
            let owner = catalog.display_name(rule.owner);
            let rhs = match &rule.production {
                Production::Match => "match".to_owned(),
                Production::Epsilon => "ε".to_owned(),
                Production::Expand(push) => push
                    .iter()
                    .map(|&c| catalog.display_name(c))
                    .collect::<Vec<_>>()
                    .join(" "),
            };
            let la = rule
                .lookahead
                .iter()
                .map(|&c| catalog.display_name(c))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(
                "{:>7}  {} -> {}  on {{{}}}\n",
                rule.tag.to_string(),
                owner,
                rhs,
                la
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SymbolCatalog, Rules) {
        let catalog = SymbolCatalog::standard().unwrap();
        let rules = Rules::standard(&catalog).unwrap();
        (catalog, rules)
    }

    fn code(catalog: &SymbolCatalog, name: &str) -> Code {
        catalog.code_of(name).unwrap()
    }

    #[test]
    fn every_symbol_has_rules() {
        let (_, rules) = setup();
        for c in Code::all().skip(1) {
            assert!(!rules.rules_for(c).is_empty(), "no rules for {c}");
        }
        assert!(rules.rules_for(Code::START).is_empty());
    }

    #[test]
    fn determinism_over_whole_table() {
        let (_, rules) = setup();
        for top in Code::all() {
            for la in Code::all() {
                let firing = rules
                    .rules_for(top)
                    .iter()
                    .filter(|r| r.fires_on(la))
                    .count();
                assert!(firing <= 1, "{top} has {firing} rules on {la}");
            }
        }
    }

    #[test]
    fn terminal_rules_match_only_themselves() {
        let (catalog, rules) = setup();
        let hai = code(&catalog, "HAI");
        let kthxbye = code(&catalog, "KTHXBYE");
        let rule = rules.resolve(hai, Some(hai)).unwrap();
        assert_eq!(rule.production, Production::Match);
        assert_eq!(rule.tag, RuleTag { id: hai, sub: 'a' });
        assert!(rules.resolve(hai, Some(kthxbye)).is_err());
        assert!(rules.resolve(Code::ID, Some(Code::CONST)).is_err());
        assert!(rules.resolve(Code::ID, Some(Code::ID)).is_ok());
    }

    #[test]
    fn non_terminal_resolution_by_lookahead() {
        let (catalog, rules) = setup();
        let body = code(&catalog, "<body>");
        let oic = code(&catalog, "OIC");
        let gimmeh = code(&catalog, "GIMMEH");

        let rule = rules.resolve(body, Some(gimmeh)).unwrap();
        assert_eq!(rule.tag.sub, 'a');
        let rule = rules.resolve(body, Some(oic)).unwrap();
        assert_eq!(rule.production, Production::Epsilon);
        let rule = rules.resolve(body, Some(Code::SEPARATOR)).unwrap();
        assert_eq!(rule.tag.sub, 'c');

        let decl = code(&catalog, "<decl>");
        let rule = rules.resolve(decl, Some(code(&catalog, "I HAS A"))).unwrap();
        let Production::Expand(push) = &rule.production else {
            panic!("expected expansion");
        };
        assert_eq!(
            push,
            &vec![
                code(&catalog, "I HAS A"),
                Code::ID,
                code(&catalog, "ITZ A"),
                code(&catalog, "<type>")
            ]
        );
    }

    #[test]
    fn missing_rule_is_reported() {
        let (catalog, rules) = setup();
        let body = code(&catalog, "<body>");
        let err = rules.resolve(body, None).unwrap_err();
        assert_eq!(err.stack_top, body);
        assert_eq!(err.lookahead, None);

        let an = code(&catalog, "AN");
        let err = rules.resolve(body, Some(an)).unwrap_err();
        assert_eq!(err.lookahead, Some(an));
    }

    #[test]
    fn expected_is_union_of_rule_lookaheads() {
        let (catalog, rules) = setup();
        let expr = code(&catalog, "<expr>");
        let expected: BTreeSet<Code> = rules.expected(expr).collect();
        assert_eq!(expected.len(), 13);
        assert!(expected.contains(&Code::ID));
        assert!(expected.contains(&code(&catalog, "WIN")));
        let body: BTreeSet<Code> = rules.expected(code(&catalog, "<body>")).collect();
        assert!(body.contains(&code(&catalog, "KTHXBYE")));
    }

    #[test]
    fn overlapping_lookahead_is_rejected() {
        let catalog = SymbolCatalog::standard().unwrap();
        let specs: Vec<RuleSpec> = GRAMMAR
            .iter()
            .map(|spec| {
                if spec.owner == "<type>" && spec.sub == 'b' {
                    RuleSpec::expand("<type>", 'b', &["NUMBAR"], &["NUMBAR", "NUMBR"])
                } else {
                    *spec
                }
            })
            .collect();
        let err = Rules::new(&catalog, &specs).unwrap_err();
        match err {
            GrammarError::Overlap {
                owner, lookahead, ..
            } => {
                assert_eq!(owner.as_str(), "<type>");
                assert_eq!(lookahead.as_str(), "NUMBR");
            }
            other => panic!("expected Overlap, got {other:?}"),
        }
    }

    #[test]
    fn bad_specs_are_rejected() {
        let catalog = SymbolCatalog::standard().unwrap();
        let unknown = [RuleSpec::epsilon("<nope>", 'a', &["OIC"])];
        assert!(matches!(
            Rules::new(&catalog, &unknown),
            Err(GrammarError::Lookup(_))
        ));
        let terminal_owner = [RuleSpec::epsilon("HAI", 'a', &["OIC"])];
        assert!(matches!(
            Rules::new(&catalog, &terminal_owner),
            Err(GrammarError::BadOwner(_))
        ));
        // every non-terminal but <lol> is missing
        let partial = [GRAMMAR[0]];
        assert!(matches!(
            Rules::new(&catalog, &partial),
            Err(GrammarError::NoRules(_))
        ));
    }

    #[test]
    fn describe_lists_every_rule() {
        let (catalog, rules) = setup();
        let listing = rules.describe(&catalog);
        assert_eq!(listing.lines().count(), rules.len());
        assert!(listing.contains("<lol> -> HAI <body> KTHXBYE  on {HAI}"));
        assert!(listing.contains("<omgs> -> ε  on {OIC}"));
    }
}
