//! Per-sheet table of extracted translatable text

use std::collections::HashSet;
use tracing::warn;

/// Key of a translation entry local to one sheet: `column:rowId`
pub fn translation_key(column: &str, row_id: &str) -> String {
    format!("{}:{}", column, row_id)
}

/// Append-only translation table. The first write for a key wins; later
/// writes are logged and discarded. Entries iterate in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: Vec<(String, String)>,
    keys: HashSet<String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` for `(column, row_id)`. Returns false for a duplicate key.
    pub fn record(&mut self, column: &str, row_id: &str, text: String) -> bool {
        let key = translation_key(column, row_id);
        if self.keys.contains(&key) {
            warn!(key = %key, "Exist key, duplicate translation discarded");
            return false;
        }
        self.keys.insert(key.clone());
        self.entries.push((key, text));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
