//! Verifies that extension tables only use identifiers of their base table

use crate::check::{load_table, ExportedTable, Finding, PostExportCheck};
use crate::error::ExportResult;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

pub struct ExtendCheck {
    export_dir: PathBuf,
    relations: BTreeMap<String, Vec<String>>,
}

impl ExtendCheck {
    pub fn new(export_dir: impl Into<PathBuf>, relations: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            export_dir: export_dir.into(),
            relations,
        }
    }

    fn load(&self, table: &str, findings: &mut Vec<Finding>) -> Option<ExportedTable> {
        let path = self.export_dir.join(format!("{}.tsv", table));
        load_table(self.name(), &path, findings)
    }
}

impl PostExportCheck for ExtendCheck {
    fn name(&self) -> &str {
        "extend-relation"
    }

    fn run(&self) -> ExportResult<Vec<Finding>> {
        let mut findings = Vec::new();
        for (base, extensions) in &self.relations {
            let Some(base_table) = self.load(base, &mut findings) else {
                continue;
            };
            let base_ids: HashSet<&str> = base_table.ids().into_iter().collect();

            for extension in extensions {
                let Some(table) = self.load(extension, &mut findings) else {
                    continue;
                };
                for id in table.ids() {
                    if !base_ids.contains(id) {
                        findings.push(Finding::UnknownExtensionKey {
                            base: base.clone(),
                            extension: extension.clone(),
                            key: id.to_string(),
                        });
                    }
                }
            }
        }
        Ok(findings)
    }
}
