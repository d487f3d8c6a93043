//! Previously translated text, merged into exported translation tables

use crate::error::{ExportError, ExportResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Translations keyed by `sheet:column:rowId`. Each entry lists the
/// canonical text first, then one string per supported language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizedText {
    entries: HashMap<String, Vec<String>>,
}

impl LocalizedText {
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Load a JSON object of `"sheet:column:id": ["canonical", "lang1", ...]`
    pub fn load(path: &Path) -> ExportResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExportError::Config(format!(
                "Failed to read localized text {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ExportResult<Self> {
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(content)?;
        Ok(Self { entries })
    }

    pub fn lookup(&self, sheet: &str, key: &str) -> Option<&[String]> {
        self.entries
            .get(&format!("{}:{}", sheet, key))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
