//! Verifies that asset paths referenced by exported tables exist on disk

use crate::check::{load_table, Finding, PostExportCheck};
use crate::config::AssetPathRule;
use crate::error::ExportResult;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

pub struct AssetPathCheck {
    export_dir: PathBuf,
    asset_root: PathBuf,
    rules: BTreeMap<String, AssetPathRule>,
}

impl AssetPathCheck {
    pub fn new(
        export_dir: impl Into<PathBuf>,
        asset_root: impl Into<PathBuf>,
        rules: BTreeMap<String, AssetPathRule>,
    ) -> Self {
        Self {
            export_dir: export_dir.into(),
            asset_root: asset_root.into(),
            rules,
        }
    }

    fn check_path(&self, table: &str, column: &str, prefix: &str, asset: &str) -> Option<Finding> {
        if asset.is_empty() {
            return None;
        }
        // Values are relative to the asset root even when written with a leading slash
        let relative = format!("{}{}", prefix, asset);
        let relative = relative.trim_start_matches(['/', '\\']);
        let path = normalize(&self.asset_root.join(relative));
        if path.is_file() {
            return None;
        }
        Some(Finding::MissingAsset {
            table: table.to_string(),
            column: column.to_string(),
            path,
        })
    }
}

impl PostExportCheck for AssetPathCheck {
    fn name(&self) -> &str {
        "asset-path"
    }

    fn run(&self) -> ExportResult<Vec<Finding>> {
        let mut findings = Vec::new();
        for (table_name, rule) in &self.rules {
            let path = self.export_dir.join(format!("{}.tsv", table_name));
            let Some(table) = load_table(self.name(), &path, &mut findings) else {
                continue;
            };
            let rows = table.rows();
            for column in &rule.columns {
                for row in &rows {
                    match row.get(column) {
                        Some(Value::String(asset)) => {
                            findings.extend(self.check_path(table_name, column, &rule.prefix, asset));
                        }
                        Some(Value::Array(items)) => {
                            for asset in items.iter().filter_map(Value::as_str) {
                                findings.extend(self.check_path(table_name, column, &rule.prefix, asset));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(findings)
    }
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
