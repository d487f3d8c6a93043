//! Workbook reader implementation - .xlsx/.xls/.ods → [`Sheet`]s

use crate::error::{ExportError, ExportResult};
use crate::schema::is_ignored;
use crate::types::{CellValue, Row, Sheet};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads every exportable sheet of one workbook
pub struct WorkbookReader {
    path: PathBuf,
}

/// Sheets read from one workbook, plus the sheets that could not be read
#[derive(Debug, Default)]
pub struct LoadedWorkbook {
    pub sheets: Vec<Sheet>,
    pub failures: Vec<ExportError>,
}

impl LoadedWorkbook {
    /// Add a sheet from its ranges, or record why its values could not be read
    pub fn add<E: fmt::Display>(
        &mut self,
        name: &str,
        values: Result<Range<Data>, E>,
        formulas: Option<&Range<String>>,
    ) {
        match values {
            Ok(values) => self.sheets.push(sheet_from_ranges(name, &values, formulas)),
            Err(e) => {
                self.failures.push(
                    ExportError::Workbook(format!("Failed to read sheet: {}", e))
                        .in_sheet(name, None, None),
                );
            }
        }
    }
}

impl WorkbookReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load all sheets in workbook order, skipping `ignore*` sheets.
    /// Only a workbook that cannot be opened is an error; an unreadable
    /// sheet is recorded and the remaining sheets are still loaded.
    pub fn read(&self) -> ExportResult<LoadedWorkbook> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            ExportError::Workbook(format!(
                "Failed to open {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut loaded = LoadedWorkbook::default();
        for name in workbook.sheet_names() {
            if is_ignored(&name) {
                debug!(sheet = %name, "Skipping ignored sheet");
                continue;
            }

            let values = workbook.worksheet_range(&name);
            let formulas = match workbook.worksheet_formula(&name) {
                Ok(range) => Some(range),
                Err(e) => {
                    warn!(sheet = %name, error = %e, "Formulas unavailable, using cached values");
                    None
                }
            };
            loaded.add(&name, values, formulas.as_ref());
        }

        Ok(loaded)
    }
}

/// Build a sheet from calamine ranges, keeping absolute cell positions
pub fn sheet_from_ranges(
    name: &str,
    values: &Range<Data>,
    formulas: Option<&Range<String>>,
) -> Sheet {
    let mut rows: Vec<Row> = Vec::new();

    if let Some((row0, col0)) = values.start() {
        for (r, cells) in values.rows().enumerate() {
            let row_index = row0 as usize + r;
            for (c, data) in cells.iter().enumerate() {
                let value = convert_data(data);
                if value.is_blank() {
                    continue;
                }
                row_at(&mut rows, row_index).set(col0 as usize + c, value);
            }
        }
    }

    if let Some(formulas) = formulas {
        if let Some((row0, col0)) = formulas.start() {
            for (r, cells) in formulas.rows().enumerate() {
                let row_index = row0 as usize + r;
                for (c, formula) in cells.iter().enumerate() {
                    if formula.is_empty() {
                        continue;
                    }
                    let col_index = col0 as usize + c;
                    let row = row_at(&mut rows, row_index);
                    let cached = row.cell(col_index).clone();
                    row.set(col_index, CellValue::formula(formula.clone(), cached));
                }
            }
        }
    }

    Sheet::new(name, rows)
}

fn row_at(rows: &mut Vec<Row>, index: usize) -> &mut Row {
    if rows.len() <= index {
        rows.resize_with(index + 1, Row::default);
    }
    &mut rows[index]
}

fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Blank,
        Data::String(s) => CellValue::text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}
