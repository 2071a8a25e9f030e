//! # symtab
//!
//! A flat, fixed-capacity symbol table built on [`indexmap::IndexSet`].
//!
//! The scanner records every distinct identifier and constant it completes;
//! the parser asks the table which category a queued lexeme belongs to.
//! Entries keep their insertion order, which is also the order of the final
//! dump.
//!
//! ## Example
//! ```rust
//! # use minilol::{Category, SymTab};
//! let mut st = SymTab::new();
//! st.insert("x", Category::Identifier).unwrap();
//! assert!(st.exists("x", Category::Identifier));
//! assert!(!st.exists("x", Category::Constant));
//! st.insert("x", Category::Identifier).unwrap(); // already there, no-op
//! assert_eq!(st.len(), 1);
//! ```

use crate::error::SymTabError;
use indexmap::IndexSet;
use smartstring::alias::String;
use std::fmt;

/// Default number of entries the table accepts.
pub const DEFAULT_CAPACITY: usize = 100;

/// Kind of value recorded in the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Identifier,
    Constant,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Identifier => "identifier",
            Category::Constant => "constant",
        })
    }
}

/// One `(name, category)` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymEntry {
    pub name: String,
    pub category: Category,
}

impl fmt::Display for SymEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.category)
    }
}

/// Insertion-ordered set of distinct `(name, category)` pairs with a hard
/// capacity.
#[derive(Debug, Clone)]
pub struct SymTab {
    tab: IndexSet<SymEntry>,
    capacity: usize,
}

impl Default for SymTab {
    fn default() -> Self {
        Self::new()
    }
}

impl SymTab {
    /// Creates an empty table holding at most [`DEFAULT_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty table holding at most `capacity` entries.
    ///
    /// ```rust
    /// # use minilol::{Category, SymTab};
    /// let mut tab = SymTab::with_capacity(1);
    /// tab.insert("x", Category::Identifier).unwrap();
    /// assert!(tab.is_full());
    /// assert!(tab.insert("y", Category::Identifier).is_err());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tab: IndexSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tab.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` once no further entry can be inserted.
    pub fn is_full(&self) -> bool {
        self.tab.len() >= self.capacity
    }

    /// Returns `true` if `name` is recorded under `category`.
    pub fn exists(&self, name: &str, category: Category) -> bool {
        self.tab.contains(&SymEntry {
            name: name.into(),
            category,
        })
    }

    /// Records `(name, category)` unless it is already present.
    ///
    /// Returns [`SymTabError::TableFull`] when a new entry would exceed the
    /// capacity; the table is left untouched in that case.
    pub fn insert(&mut self, name: &str, category: Category) -> Result<(), SymTabError> {
        let entry = SymEntry {
            name: name.into(),
            category,
        };
        if self.tab.contains(&entry) {
            return Ok(());
        }
        if self.is_full() {
            return Err(SymTabError::TableFull {
                name: entry.name,
                category,
                capacity: self.capacity,
            });
        }
        log::debug!("{} added: {}", category, name);
        self.tab.insert(entry);
        Ok(())
    }

    /// Category under which `name` is recorded, identifiers first.
    pub fn category_of(&self, name: &str) -> Option<Category> {
        [Category::Identifier, Category::Constant]
            .into_iter()
            .find(|&category| self.exists(name, category))
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &SymEntry> {
        self.tab.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SymEntry> {
        self.tab.get_index(index)
    }
}

impl fmt::Display for SymTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol Table:")?;
        for entry in &self.tab {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
