//! Workbook ingestion: Excel/ODS files → in-memory sheets
//!
//! Cell values come from calamine's value range; cells that also appear in
//! the formula range become formula cells wrapping their cached result.

mod reader;

pub use reader::{sheet_from_ranges, LoadedWorkbook, WorkbookReader};
