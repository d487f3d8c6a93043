//! SheetForge - schema-driven spreadsheet exporter
//!
//! Converts game-design workbooks into tab-separated tables plus a side
//! table of translatable text. Each sheet declares its own schema in its
//! first rows (names, type tokens, export scopes).
//!
//! # Features
//!
//! - Typed columns: string, number, boolean, color, json, translate, link_*, links_*
//! - `pos.x` / `pos.y` columns exported as one JSON object, repeated names as a JSON array
//! - Client/server export passes from one sheet via scope tokens
//! - Translation tables merged with existing localized text
//! - Post-export checks for asset paths and table extensions
//!
//! # Example
//!
//! ```no_run
//! use sheetforge::excel::WorkbookReader;
//! use sheetforge::export::{DirectoryTarget, ExportOptions, SheetExporter};
//!
//! let workbook = WorkbookReader::new("Design/Items.xlsx").read()?;
//! let options = ExportOptions::default();
//! let mut target = DirectoryTarget::new("Export");
//! for sheet in &workbook.sheets {
//!     SheetExporter::new(&options).export(sheet, &mut target)?;
//! }
//! # Ok::<(), sheetforge::error::ExportError>(())
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod export;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use error::{ExportError, ExportResult};
pub use types::{CellValue, Row, Sheet};
