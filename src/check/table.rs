//! Reads exported tables back into typed JSON rows

use crate::error::{ExportError, ExportResult};
use crate::export::FIELD_DELIMITER;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// An exported `.tsv` table: header names, type labels and data lines
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTable {
    pub names: Vec<String>,
    pub labels: Vec<String>,
    pub lines: Vec<Vec<String>>,
}

impl ExportedTable {
    pub fn load(path: &Path) -> ExportResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExportError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines();
        let names = lines.next().map(split_fields).unwrap_or_default();
        let labels = lines.next().map(split_fields).unwrap_or_default();
        let lines = lines
            .filter(|line| !line.is_empty())
            .map(split_fields)
            .collect();
        Self {
            names,
            labels,
            lines,
        }
    }

    /// Identifier (first field) of every data line
    pub fn ids(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| line.first().map(String::as_str))
            .collect()
    }

    /// Data lines as JSON objects keyed by column name, values typed by label
    pub fn rows(&self) -> Vec<Map<String, Value>> {
        self.lines
            .iter()
            .map(|line| {
                self.names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let raw = line.get(i).map(String::as_str).unwrap_or("");
                        let label = self.labels.get(i).map(String::as_str).unwrap_or("string");
                        (name.clone(), typed_value(label, raw))
                    })
                    .collect()
            })
            .collect()
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(FIELD_DELIMITER).map(str::to_string).collect()
}

fn typed_value(label: &str, raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match label {
        "number" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        "boolean" => Value::Bool(raw == "1" || raw == "true"),
        "json" | "links" => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        _ => Value::String(raw.to_string()),
    }
}
