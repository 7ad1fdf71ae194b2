use serde::Serialize;
use std::collections::HashMap;

/// Broad grouping of symbols, used for colouring rendered glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolCategory {
    /// def, defn, let, letfn, doseq
    Binding,
    /// fn, #(, partial, comp, threading macros
    Function,
    /// and, or, not
    Logic,
    /// not=, >=, <=
    Comparison,
    /// set literals and set operators
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    pub glyph: &'static str,
    pub category: SymbolCategory,
}

const BUILTIN_SYMBOLS: &[(&str, &str, SymbolCategory)] = &[
    ("(fn", "λ", SymbolCategory::Function),
    ("(let", "⊢", SymbolCategory::Binding),
    ("(letfn", "λ", SymbolCategory::Binding),
    ("(def", "≡", SymbolCategory::Binding),
    ("(defn", "ƒ", SymbolCategory::Binding),
    ("(doseq", "∀", SymbolCategory::Binding),
    ("(->", "→", SymbolCategory::Function),
    ("(->>", "⇉", SymbolCategory::Function),
    ("partial", "Ƥ", SymbolCategory::Function),
    ("comp", "∘", SymbolCategory::Function),
    ("not=", "≠", SymbolCategory::Comparison),
    ("and", "∧", SymbolCategory::Logic),
    ("or", "∨", SymbolCategory::Logic),
    ("not", "¬", SymbolCategory::Logic),
    (">=", "≥", SymbolCategory::Comparison),
    ("<=", "≤", SymbolCategory::Comparison),
    ("#(", "λ(", SymbolCategory::Function),
    ("#{", "∈{", SymbolCategory::Set),
    ("#{}", "∅", SymbolCategory::Set),
    ("union", "⋃", SymbolCategory::Set),
    ("intersection", "⋂", SymbolCategory::Set),
    ("difference", "−", SymbolCategory::Set),
];

/// Mapping from canonical symbol key to its display glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    entries: HashMap<&'static str, SymbolEntry>,
}

impl SymbolTable {
    /// The standard table of 22 symbols
    pub fn builtin() -> Self {
        let entries = BUILTIN_SYMBOLS
            .iter()
            .map(|&(key, glyph, category)| (key, SymbolEntry { glyph, category }))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&SymbolEntry> {
        self.entries.get(key)
    }

    pub fn glyph(&self, key: &str) -> Option<&'static str> {
        self.get(key).map(|entry| entry.glyph)
    }

    pub fn remove(&mut self, key: &str) -> Option<SymbolEntry> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key
    pub fn entries(&self) -> Vec<(&'static str, SymbolEntry)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::builtin()
    }
}
