//! Export configuration read from a config directory
//!
//! ```text
//! Config/
//!   Export.json          ["Design/Items.xlsx", ...]            (required)
//!   Languages.json       ["en", "jp"]
//!   AssetPath.json       {"Items": {"Prefix": "Icons/", "Columns": ["icon"]}}
//!   ExtendRelation.json  {"Unit": ["Hero", "Monster"]}
//!   Settings.json        {"output_dir": "../Export", ...}
//! ```
//!
//! Relative paths in `Settings.json` resolve against the parent of the
//! config directory.

use crate::error::{ExportError, ExportResult};
use crate::export::{ExportOptions, LocalizedText};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPORT_FILE: &str = "Export.json";
pub const LANGUAGES_FILE: &str = "Languages.json";
pub const ASSET_PATH_FILE: &str = "AssetPath.json";
pub const EXTEND_RELATION_FILE: &str = "ExtendRelation.json";
pub const SETTINGS_FILE: &str = "Settings.json";

/// Asset columns of one exported table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetPathRule {
    #[serde(rename = "Prefix", alias = "prefix", default)]
    pub prefix: String,
    #[serde(rename = "Columns", alias = "columns", default)]
    pub columns: Vec<String>,
}

/// One export pass: columns whose scope contains `scope`, files named with `suffix`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PassConfig {
    pub scope: String,
    #[serde(default)]
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base directory of the workbook paths in `Export.json`
    pub source_root: PathBuf,
    pub output_dir: PathBuf,
    /// Base directory of asset paths checked after export
    pub asset_root: PathBuf,
    /// Header of the canonical text column in translation tables
    pub canonical_label: String,
    /// JSON file of existing translations
    pub localized_text: Option<PathBuf>,
    pub passes: Vec<PassConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from(".."),
            output_dir: PathBuf::from("../Export"),
            asset_root: PathBuf::from("."),
            canonical_label: "cn".to_string(),
            localized_text: None,
            passes: vec![
                PassConfig {
                    scope: "c".to_string(),
                    suffix: String::new(),
                },
                PassConfig {
                    scope: "s".to_string(),
                    suffix: "_Server".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportConfig {
    pub files: Vec<String>,
    pub languages: Vec<String>,
    pub asset_paths: BTreeMap<String, AssetPathRule>,
    pub extend_relations: BTreeMap<String, Vec<String>>,
    pub settings: Settings,
}

impl ExportConfig {
    /// Load every config file from `dir`. Only `Export.json` is required.
    pub fn load(dir: &Path) -> ExportResult<Self> {
        let files: Vec<String> = read_json(&dir.join(EXPORT_FILE))?;
        let languages = read_optional(&dir.join(LANGUAGES_FILE))?;
        let asset_paths = read_optional(&dir.join(ASSET_PATH_FILE))?;
        let extend_relations = read_optional(&dir.join(EXTEND_RELATION_FILE))?;
        let mut settings: Settings = read_optional(&dir.join(SETTINGS_FILE))?;

        let base = dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        settings.source_root = resolve(base, &settings.source_root);
        settings.output_dir = resolve(base, &settings.output_dir);
        settings.asset_root = resolve(base, &settings.asset_root);
        settings.localized_text = settings.localized_text.map(|p| resolve(base, &p));

        if settings.passes.is_empty() {
            return Err(ExportError::Config(format!(
                "{} defines no export passes",
                SETTINGS_FILE
            )));
        }

        Ok(Self {
            files,
            languages,
            asset_paths,
            extend_relations,
            settings,
        })
    }

    pub fn output_dir(&self) -> PathBuf {
        self.settings.output_dir.clone()
    }

    pub fn asset_root(&self) -> PathBuf {
        self.settings.asset_root.clone()
    }

    /// Workbook paths resolved against the source root
    pub fn workbooks(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .map(|f| resolve(&self.settings.source_root, Path::new(f)))
            .collect()
    }

    /// Keep only the pass exporting `scope`
    pub fn restrict_scope(&mut self, scope: &str) -> ExportResult<()> {
        self.settings.passes.retain(|p| p.scope == scope);
        if self.settings.passes.is_empty() {
            return Err(ExportError::Config(format!(
                "No export pass with scope '{}'",
                scope
            )));
        }
        Ok(())
    }

    pub fn load_localized_text(&self) -> ExportResult<Option<LocalizedText>> {
        self.settings
            .localized_text
            .as_deref()
            .map(LocalizedText::load)
            .transpose()
    }

    /// Options of every configured pass, in order
    pub fn pass_options(&self, localized: Option<&LocalizedText>) -> Vec<ExportOptions> {
        self.settings
            .passes
            .iter()
            .map(|pass| ExportOptions {
                scope: pass.scope.clone(),
                suffix: pass.suffix.clone(),
                canonical_label: self.settings.canonical_label.clone(),
                languages: self.languages.clone(),
                localized: localized.cloned(),
            })
            .collect()
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ExportResult<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        ExportError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| ExportError::Config(format!("Invalid {}: {}", path.display(), e)))
}

fn read_optional<T: DeserializeOwned + Default>(path: &Path) -> ExportResult<T> {
    if path.exists() {
        read_json(path)
    } else {
        Ok(T::default())
    }
}
