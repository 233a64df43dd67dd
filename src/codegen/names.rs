//! Name Resolution Pass
//!
//! Maps namespaced identifiers (`com.example.getThing`) to the PascalCase
//! symbols used as keys in generated declarations (`ComExampleGetThing`).
//!
//! The table is built once per generation run. Symbols must be distinct:
//! two identifiers that normalize to the same symbol are rejected instead of
//! one silently replacing the other.

use std::collections::HashMap;

use crate::error::{CodegenError, Result};

// =============================================================================
// Normalizer
// =============================================================================

/// Convert a dotted identifier into a symbol name.
///
/// Each segment keeps its own casing except for the first character, which is
/// upper-cased. Segments are joined without a separator.
pub fn nsid_to_symbol(nsid: &str) -> Result<String> {
    if nsid.is_empty() {
        return Err(CodegenError::normalization(nsid, "identifier is empty"));
    }

    let mut symbol = String::with_capacity(nsid.len());
    for (index, segment) in nsid.split('.').enumerate() {
        let mut chars = segment.chars();
        match chars.next() {
            None => {
                return Err(CodegenError::normalization(
                    nsid,
                    format!("segment {} is empty", index + 1),
                ));
            }
            Some(first) => {
                symbol.extend(first.to_uppercase());
                symbol.push_str(chars.as_str());
            }
        }
    }

    Ok(symbol)
}

// =============================================================================
// Symbol Table
// =============================================================================

/// Identifier -> symbol mapping with collision detection.
///
/// Entries keep insertion order so callers can iterate in input order.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    /// (identifier, symbol) in insertion order
    entries: Vec<(String, String)>,

    /// symbol -> index into `entries`
    by_symbol: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from identifiers, failing on the first collision.
    pub fn build<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut table = Self::new();
        for id in ids {
            table.insert(id)?;
        }
        Ok(table)
    }

    /// Normalize `nsid` and record it. Returns the symbol.
    pub fn insert(&mut self, nsid: &str) -> Result<&str> {
        let symbol = nsid_to_symbol(nsid)?;

        if let Some(&existing) = self.by_symbol.get(&symbol) {
            return Err(CodegenError::SymbolCollision {
                symbol,
                first: self.entries[existing].0.clone(),
                second: nsid.to_string(),
            });
        }

        let index = self.entries.len();
        self.by_symbol.insert(symbol.clone(), index);
        self.entries.push((nsid.to_string(), symbol));
        Ok(&self.entries[index].1)
    }

    /// Get the symbol assigned to an identifier
    pub fn symbol(&self, nsid: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == nsid)
            .map(|(_, symbol)| symbol.as_str())
    }

    /// Get the identifier that produced a symbol
    pub fn identifier(&self, symbol: &str) -> Option<&str> {
        self.by_symbol
            .get(symbol)
            .map(|&index| self.entries[index].0.as_str())
    }

    /// Iterate (identifier, symbol) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, symbol)| (id.as_str(), symbol.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
