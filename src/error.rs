use thiserror::Error;

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Unsupported type: {0}")]
    UnknownType(String),

    #[error("Export failed: {0}")]
    Failed(String),

    #[error("{}", sheet_location(sheet, *row, column.as_deref(), source))]
    Sheet {
        sheet: String,
        row: Option<usize>,
        column: Option<String>,
        source: Box<ExportError>,
    },
}

impl ExportError {
    /// Attach sheet/row/column context to an error raised while exporting a sheet
    pub fn in_sheet(self, sheet: &str, row: Option<usize>, column: Option<&str>) -> Self {
        match self {
            // Already located, keep the innermost context
            located @ ExportError::Sheet { .. } => located,
            other => ExportError::Sheet {
                sheet: sheet.to_string(),
                row,
                column: column.map(str::to_string),
                source: Box::new(other),
            },
        }
    }

    /// True for schema/configuration problems (as opposed to bad cell data)
    pub fn is_configuration(&self) -> bool {
        match self {
            ExportError::Config(_) | ExportError::UnknownType(_) => true,
            ExportError::Sheet { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

fn sheet_location(
    sheet: &str,
    row: Option<usize>,
    column: Option<&str>,
    source: &ExportError,
) -> String {
    let mut location = format!("sheet '{}'", sheet);
    if let Some(row) = row {
        location.push_str(&format!(", row {}", row));
    }
    if let Some(column) = column {
        location.push_str(&format!(", column '{}'", column));
    }
    format!("Export failed at {}: {}", location, source)
}
