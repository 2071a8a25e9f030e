//! # Symbol Catalog
//!
//! Every grammar symbol of Mini-LOL has exactly one small integer [`Code`]:
//!
//! - `0`: the start marker `Z_o`,
//! - `1..=2`: the value terminals `[id]` and `[const]`,
//! - `3..=41`: literal keyword and punctuation terminals (`41` is `;`),
//! - `42..=64`: non-terminals, `<lol>` first.
//!
//! [`SymbolCatalog`] holds the bijection between names and codes. It is built
//! once from [`SYMBOLS`] and never mutated afterwards.
//!
//! ```rust
//! # use minilol::{Code, SymbolCatalog};
//! let catalog = SymbolCatalog::standard().unwrap();
//! assert_eq!(catalog.code_of("I HAS A").unwrap(), Code::new(7));
//! assert_eq!(catalog.name_of(Code::LOL).unwrap(), "<lol>");
//! ```

use crate::error::{CatalogError, LookupError};
use smartstring::alias::String;
use std::collections::HashMap;
use std::fmt;

/// Number of grammar symbols, start marker included.
pub const SYMBOL_COUNT: usize = 65;

/// The literal symbol table, indexed by code.
pub const SYMBOLS: [&str; SYMBOL_COUNT] = [
    "Z_o",
    "[id]",
    "[const]",
    "HAI",
    "KTHXBYE",
    "GIMMEH",
    "VISIBLE",
    "I HAS A",
    "ITZ A",
    "NUMBR",
    "NUMBAR",
    "TROOF",
    "WIN",
    "FAIL",
    "R",
    "IM IN YR",
    "WILE",
    "IM OUTTA YR",
    "O RLY?",
    "YA RLY",
    "NO WAI",
    "OIC",
    "WTF?",
    "OMG",
    "FOUND YR",
    "GTFO",
    "HOW IZ I",
    "IF U SAY SO",
    "YR",
    "I IZ",
    "MKAY",
    "SUM OF",
    "AN",
    "DIFF OF",
    "PRODUKT OF",
    "QUOSHUNT OF",
    "BOTH OF",
    "EITHER OF",
    "NOT",
    "BOTH SAEM",
    "DIFFRINT",
    ";",
    "<lol>",
    "<body>",
    "<stmt>",
    "<input>",
    "<output>",
    "<decl>",
    "<type>",
    "<asmt>",
    "<loop>",
    "<if>",
    "<case>",
    "<omgs>",
    "<omg>",
    "<value>",
    "<return>",
    "<function>",
    "<args>",
    "<arg>",
    "<call>",
    "<expr>",
    "<arith>",
    "<bool>",
    "<comp>",
];

/// Integer code of a grammar symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code(u8);

impl Code {
    /// Start marker `Z_o`; bottom of the parser stack.
    pub const START: Code = Code(0);
    /// Identifier value terminal `[id]`.
    pub const ID: Code = Code(1);
    /// Constant value terminal `[const]`.
    pub const CONST: Code = Code(2);
    /// Statement separator `;`.
    pub const SEPARATOR: Code = Code(41);
    /// Root non-terminal `<lol>`.
    pub const LOL: Code = Code(42);

    /// Highest terminal code.
    pub const LAST_TERMINAL: Code = Code(41);
    /// Lowest non-terminal code.
    pub const FIRST_NONTERMINAL: Code = Code(42);
    /// Highest code in the catalog.
    pub const LAST: Code = Code(SYMBOL_COUNT as u8 - 1);

    /// Wraps a raw code. Range checks happen on catalog lookup.
    ///
    /// ```rust
    /// # use minilol::Code;
    /// let code = Code::new(42);
    /// assert_eq!(code, Code::LOL);
    /// assert_eq!(code.as_u8(), 42);
    /// assert!(code.is_nonterminal());
    /// ```
    #[inline]
    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    /// The raw code.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Returns `true` for the start marker `Z_o`.
    #[inline]
    pub const fn is_start(self) -> bool {
        self.0 == Self::START.0
    }

    /// Terminals are `[id]`, `[const]`, keywords and `;` (`1..=41`).
    #[inline]
    pub const fn is_terminal(self) -> bool {
        self.0 >= Self::ID.0 && self.0 <= Self::LAST_TERMINAL.0
    }

    /// Non-terminals are `<lol>` through `<comp>` (`42..=64`).
    #[inline]
    pub const fn is_nonterminal(self) -> bool {
        self.0 >= Self::FIRST_NONTERMINAL.0 && self.0 <= Self::LAST.0
    }

    /// Literal keyword or punctuation terminal (`3..=41`).
    #[inline]
    pub const fn is_literal(self) -> bool {
        self.0 > Self::CONST.0 && self.0 <= Self::LAST_TERMINAL.0
    }

    /// All codes in ascending order.
    pub fn all() -> impl Iterator<Item = Code> {
        (0..SYMBOL_COUNT as u8).map(Code)
    }
}

impl From<Code> for usize {
    fn from(code: Code) -> Self {
        code.0 as usize
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bidirectional mapping between symbol names and [`Code`]s.
#[derive(Debug, Default, Clone)]
pub struct SymbolCatalog {
    codes: HashMap<String, Code>,
    names: Vec<Option<String>>,
}

impl SymbolCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            codes: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// Builds the fixed Mini-LOL catalog from [`SYMBOLS`].
    pub fn standard() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (code, name) in Code::all().zip(SYMBOLS) {
            catalog.register(name, code)?;
        }
        Ok(catalog)
    }

    /// Inserts a name/code pair. Both sides must be fresh.
    pub fn register(&mut self, name: &str, code: Code) -> Result<(), CatalogError> {
        if let Some(&existing) = self.codes.get(name) {
            return Err(CatalogError::DuplicateName {
                name: name.into(),
                existing,
            });
        }
        let idx: usize = code.into();
        if let Some(Some(existing)) = self.names.get(idx) {
            return Err(CatalogError::DuplicateCode {
                code,
                existing: existing.clone(),
            });
        }
        if self.names.len() <= idx {
            self.names.resize(idx + 1, None);
        }
        self.names[idx] = Some(name.into());
        self.codes.insert(name.into(), code);
        Ok(())
    }

    /// Code registered for `name`.
    ///
    /// # Errors
    /// [`LookupError::UnknownName`] if `name` is not in the catalog.
    ///
    /// ```rust
    /// # use minilol::{Code, SymbolCatalog};
    /// let catalog = SymbolCatalog::standard().unwrap();
    /// assert_eq!(catalog.code_of(";").unwrap(), Code::SEPARATOR);
    /// assert!(catalog.code_of("VIZIBLE").is_err());
    /// ```
    pub fn code_of(&self, name: &str) -> Result<Code, LookupError> {
        self.codes
            .get(name)
            .copied()
            .ok_or_else(|| LookupError::UnknownName(name.into()))
    }

    /// Name registered for `code`.
    ///
    /// # Errors
    /// [`LookupError::UnknownCode`] if no name carries `code`.
    pub fn name_of(&self, code: Code) -> Result<&str, LookupError> {
        let idx: usize = code.into();
        self.names
            .get(idx)
            .and_then(|n| n.as_deref())
            .ok_or(LookupError::UnknownCode(code))
    }

    /// Name of `code` for diagnostics; falls back to the number.
    pub fn display_name(&self, code: Code) -> std::string::String {
        match self.name_of(code) {
            Ok(name) => name.to_owned(),
            Err(_) => format!("#{code}"),
        }
    }

    /// Number of registered symbols.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Registered `(code, name)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (Code, &str)> {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_deref().map(|n| (Code(i as u8), n)))
    }
}
