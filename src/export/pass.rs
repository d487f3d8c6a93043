//! Export pass: every workbook, every sheet, one scope

use crate::error::ExportError;
use crate::excel::WorkbookReader;
use crate::export::{ExportOptions, OutputTarget, SheetExporter, SheetReport};
use crate::types::Sheet;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A sheet or workbook that failed to export
#[derive(Debug)]
pub struct ExportFailure {
    pub workbook: PathBuf,
    pub error: ExportError,
}

/// Outcome of one pass over all workbooks
#[derive(Debug, Default)]
pub struct PassReport {
    pub scope: String,
    pub sheets: Vec<SheetReport>,
    pub failures: Vec<ExportFailure>,
}

impl PassReport {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ExportPass<'a> {
    options: &'a ExportOptions,
}

impl<'a> ExportPass<'a> {
    pub fn new(options: &'a ExportOptions) -> Self {
        Self { options }
    }

    /// Export every workbook in order. A failing sheet or workbook is
    /// recorded and the pass continues with the next one.
    pub fn run(&self, workbooks: &[PathBuf], target: &mut dyn OutputTarget) -> PassReport {
        let mut report = PassReport {
            scope: self.options.scope.clone(),
            ..PassReport::default()
        };

        for path in workbooks {
            info!(workbook = %path.display(), scope = %self.options.scope, "Open workbook");
            match WorkbookReader::new(path).read() {
                Ok(loaded) => {
                    for e in loaded.failures {
                        error!(workbook = %path.display(), error = %e, "Sheet read failed");
                        report.failures.push(ExportFailure {
                            workbook: path.clone(),
                            error: e,
                        });
                    }
                    self.export_sheets(path, &loaded.sheets, target, &mut report);
                }
                Err(e) => {
                    error!(workbook = %path.display(), error = %e, "Workbook export failed");
                    report.failures.push(ExportFailure {
                        workbook: path.clone(),
                        error: e,
                    });
                }
            }
        }

        report
    }

    /// Export already loaded sheets of one workbook
    pub fn export_sheets(
        &self,
        workbook: &Path,
        sheets: &[Sheet],
        target: &mut dyn OutputTarget,
        report: &mut PassReport,
    ) {
        let exporter = SheetExporter::new(self.options);
        for sheet in sheets {
            match exporter.export(sheet, target) {
                Ok(Some(sheet_report)) => report.sheets.push(sheet_report),
                Ok(None) => {}
                Err(e) => {
                    let e = e.in_sheet(&sheet.name, None, None);
                    error!(error = %e, "Sheet export failed");
                    report.failures.push(ExportFailure {
                        workbook: workbook.to_path_buf(),
                        error: e,
                    });
                }
            }
        }
    }
}
