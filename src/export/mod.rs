//! Row export: sheets → tab-separated tables plus translation tables

mod exporter;
mod localized;
mod output;
mod pass;

pub use exporter::{ExportOptions, SheetExporter, SheetReport};
pub use localized::LocalizedText;
pub use output::{write_line, DirectoryTarget, MemoryTarget, OutputTarget, FIELD_DELIMITER};
pub use pass::{ExportFailure, ExportPass, PassReport};
