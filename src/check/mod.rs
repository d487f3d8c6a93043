//! Post-export checks over already written tables
//!
//! Checks are diagnostic only: they read exported files, report findings
//! and never modify output or fail the export.

mod asset_path;
mod extend;
mod table;

pub use asset_path::AssetPathCheck;
pub use extend::ExtendCheck;
pub use table::ExportedTable;

use crate::config::ExportConfig;
use crate::error::ExportResult;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// A problem found in exported output
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    MissingAsset {
        table: String,
        column: String,
        path: PathBuf,
    },
    UnknownExtensionKey {
        base: String,
        extension: String,
        key: String,
    },
    /// The check itself could not run (e.g. table not exported)
    CheckFailed { check: String, message: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::MissingAsset {
                table,
                column,
                path,
            } => write!(
                f,
                "Asset not exist: {} ({}.{})",
                path.display(),
                table,
                column
            ),
            Finding::UnknownExtensionKey {
                base,
                extension,
                key,
            } => write!(f, "{},{}:{} not found in base {}", extension, base, key, base),
            Finding::CheckFailed { check, message } => {
                write!(f, "Check '{}' could not run: {}", check, message)
            }
        }
    }
}

pub trait PostExportCheck {
    fn name(&self) -> &str;
    fn run(&self) -> ExportResult<Vec<Finding>>;
}

/// Checks enabled by the configuration, in a fixed order
pub fn registry(config: &ExportConfig) -> Vec<Box<dyn PostExportCheck>> {
    let mut checks: Vec<Box<dyn PostExportCheck>> = Vec::new();
    if !config.extend_relations.is_empty() {
        checks.push(Box::new(ExtendCheck::new(
            config.output_dir(),
            config.extend_relations.clone(),
        )));
    }
    if !config.asset_paths.is_empty() {
        checks.push(Box::new(AssetPathCheck::new(
            config.output_dir(),
            config.asset_root(),
            config.asset_paths.clone(),
        )));
    }
    checks
}

/// Load an exported table; an unreadable table becomes a `CheckFailed`
/// finding so the calling check can move on to its next table.
fn load_table(check: &str, path: &Path, findings: &mut Vec<Finding>) -> Option<ExportedTable> {
    match ExportedTable::load(path) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(check, error = %e, "Skipping unreadable table");
            findings.push(Finding::CheckFailed {
                check: check.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}

/// Run every check to completion; failures of a check become findings
pub fn run_checks(checks: &[Box<dyn PostExportCheck>]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for check in checks {
        match check.run() {
            Ok(found) => {
                for finding in &found {
                    warn!(check = check.name(), "{}", finding);
                }
                findings.extend(found);
            }
            Err(e) => {
                error!(check = check.name(), error = %e, "Check could not run");
                findings.push(Finding::CheckFailed {
                    check: check.name().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    findings
}
