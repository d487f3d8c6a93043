//! Row exporter: streams data rows through a sheet's schema

use crate::error::{ExportError, ExportResult};
use crate::export::localized::LocalizedText;
use crate::export::output::{write_line, OutputTarget};
use crate::schema::{RowContext, Schema, SchemaBuilder, TranslationTable, HEADER_ROWS};
use crate::types::Sheet;
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info, warn};

/// Settings of one export pass
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Scope token selecting columns (`c`, `s`, ...)
    pub scope: String,
    /// Appended to every output file stem, e.g. `_Server`
    pub suffix: String,
    /// Header of the canonical text column in translation tables
    pub canonical_label: String,
    /// Extra language columns, filled from `localized`
    pub languages: Vec<String>,
    pub localized: Option<LocalizedText>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scope: "c".to_string(),
            suffix: String::new(),
            canonical_label: "cn".to_string(),
            languages: Vec::new(),
            localized: None,
        }
    }
}

impl ExportOptions {
    pub fn table_name(&self, sheet: &str) -> String {
        format!("{}{}.tsv", sheet, self.suffix)
    }

    pub fn translation_name(&self, sheet: &str) -> String {
        format!("{}{}_i18n.tsv", sheet, self.suffix)
    }
}

/// Outcome of exporting one sheet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetReport {
    pub sheet: String,
    pub columns: usize,
    pub rows: usize,
    pub translations: usize,
}

pub struct SheetExporter<'a> {
    options: &'a ExportOptions,
}

impl<'a> SheetExporter<'a> {
    pub fn new(options: &'a ExportOptions) -> Self {
        Self { options }
    }

    /// Export `sheet` into `target`. Returns `None` when the pass selects no
    /// columns. On failure the lines written so far are flushed and kept.
    pub fn export(
        &self,
        sheet: &Sheet,
        target: &mut dyn OutputTarget,
    ) -> ExportResult<Option<SheetReport>> {
        let schema = SchemaBuilder::new(&self.options.scope).build(sheet)?;
        if schema.is_empty() {
            debug!(sheet = %sheet.name, scope = %self.options.scope, "No columns to export");
            return Ok(None);
        }

        let table_name = self.options.table_name(&sheet.name);
        let mut translations = TranslationTable::new();
        let mut out = target.open(&table_name)?;
        let written = self.write_table(sheet, &schema, out.as_mut(), &mut translations);
        let flushed = out.flush();
        let rows = written?;
        flushed?;

        info!(
            sheet = %sheet.name,
            file = %table_name,
            rows,
            "Exported sheet"
        );

        if !translations.is_empty() {
            let name = self.options.translation_name(&sheet.name);
            let mut out = target.open(&name)?;
            let written = self.write_translations(sheet, &translations, out.as_mut());
            let flushed = out.flush();
            written?;
            flushed?;
        }

        Ok(Some(SheetReport {
            sheet: sheet.name.clone(),
            columns: schema.len(),
            rows,
            translations: translations.len(),
        }))
    }

    /// Header lines followed by one line per accepted data row
    fn write_table(
        &self,
        sheet: &Sheet,
        schema: &Schema,
        out: &mut dyn Write,
        translations: &mut TranslationTable,
    ) -> ExportResult<usize> {
        write_line(out, &schema.names())?;
        write_line(out, &schema.labels())?;

        let Some(identifier) = schema.identifier() else {
            return Ok(0);
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut values: Vec<String> = Vec::with_capacity(schema.len());
        let mut rows = 0;

        for (index, row) in sheet.rows.iter().enumerate().skip(HEADER_ROWS) {
            if row.is_empty() {
                continue;
            }
            let row_number = index + 1;
            let located = |e: ExportError, column: &str| {
                e.in_sheet(&sheet.name, Some(row_number), Some(column))
            };

            let id = identifier
                .text(row)
                .map_err(|e| located(e, &identifier.name))?;
            if id.is_empty() {
                continue;
            }
            if !seen.insert(id.clone()) {
                return Err(located(
                    ExportError::Data(format!("Duplicate id '{}'", id)),
                    &identifier.name,
                ));
            }

            values.clear();
            let mut ctx = RowContext::new(&id, translations);
            for converter in &schema.converters {
                let value = converter
                    .convert(row, &mut ctx)
                    .map_err(|e| located(e, converter.name()))?;
                check_field(&value).map_err(|e| located(e, converter.name()))?;
                values.push(value);
            }
            write_line(out, &values)?;
            rows += 1;
        }

        Ok(rows)
    }

    /// `id`, canonical text and, with a localized source, one column per language
    fn write_translations(
        &self,
        sheet: &Sheet,
        translations: &TranslationTable,
        out: &mut dyn Write,
    ) -> ExportResult<()> {
        let localized = self.options.localized.as_ref();
        let languages: &[String] = match localized {
            Some(_) => &self.options.languages,
            None => &[],
        };

        let mut header = vec!["id".to_string(), self.options.canonical_label.clone()];
        header.extend(languages.iter().cloned());
        write_line(out, &header)?;
        write_line(out, &vec!["string"; header.len()])?;

        for (key, text) in translations.iter() {
            check_field(text).map_err(|e| e.in_sheet(&sheet.name, None, Some(key)))?;

            let mut line = vec![key.to_string(), text.to_string()];
            if let Some(localized) = localized {
                match localized.lookup(&sheet.name, key) {
                    Some(entry) => {
                        if entry.first().map(String::as_str) != Some(text) {
                            warn!(
                                sheet = %sheet.name,
                                key,
                                "Canonical text changed since last translation"
                            );
                        }
                        for i in 0..languages.len() {
                            line.push(entry.get(i + 1).cloned().unwrap_or_default());
                        }
                    }
                    None => {
                        warn!(sheet = %sheet.name, key, "No localized text");
                        line.extend(std::iter::repeat(String::new()).take(languages.len()));
                    }
                }
            }
            write_line(out, &line)?;
        }

        Ok(())
    }
}

/// Exported fields can not carry the delimiter or a line break
fn check_field(value: &str) -> ExportResult<()> {
    if value.contains(|c: char| c == '\t' || c == '\n' || c == '\r') {
        return Err(ExportError::Data(format!(
            "Value '{}' contains a tab or line break",
            value.escape_debug()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::output::MemoryTarget;
    use crate::types::{CellValue, Row};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn sheet(header: [&[&str]; 3], data: &[&[&str]]) -> Sheet {
        let mut rows = vec![
            Row::from_strings(header[0]),
            Row::from_strings(header[1]),
            Row::default(),
            Row::from_strings(header[2]),
        ];
        rows.extend(data.iter().map(|r| Row::from_strings(*r)));
        Sheet::new("Items", rows)
    }

    fn export(sheet: &Sheet, options: &ExportOptions) -> (ExportResult<Option<SheetReport>>, MemoryTarget) {
        let mut target = MemoryTarget::new();
        let result = SheetExporter::new(options).export(sheet, &mut target);
        (result, target)
    }

    #[test]
    fn test_object_column_scenario() {
        let source = sheet(
            [
                &["id", "pos.x", "pos.y"],
                &["string", "number", "number"],
                &["cs", "cs", "cs"],
            ],
            &[&["A1", "1", "2"]],
        );
        let (result, target) = export(&source, &ExportOptions::default());
        let report = result.unwrap().unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(
            target.contents("Items.tsv").unwrap(),
            "id\tpos\nstring\tjson\nA1\t{\"x\":1,\"y\":2}\n"
        );
    }

    #[test]
    fn test_array_column_scenario() {
        let source = sheet(
            [&["id", "tag", "tag"], &["string", "string", "string"], &["c", "c", "c"]],
            &[&["A1", "red", "blue"]],
        );
        let (result, target) = export(&source, &ExportOptions::default());
        result.unwrap();
        let table = target.contents("Items.tsv").unwrap();
        assert_eq!(table.lines().nth(2), Some("A1\t[\"red\",\"blue\"]"));
    }

    #[test]
    fn test_translate_column_scenario() {
        let source = sheet(
            [&["id", "desc"], &["string", "translate"], &["c", "c"]],
            &[&["A1", "Hello"]],
        );
        let (result, target) = export(&source, &ExportOptions::default());
        assert_eq!(result.unwrap().unwrap().translations, 1);
        assert_eq!(
            target.contents("Items.tsv").unwrap(),
            "id\tdesc\nstring\ttranslate\nA1\t\n"
        );
        assert_eq!(
            target.contents("Items_i18n.tsv").unwrap(),
            "id\tcn\nstring\tstring\ndesc:A1\tHello\n"
        );
    }

    #[test]
    fn test_duplicate_id_fails_with_row_number() {
        let source = sheet(
            [&["id", "hp"], &["string", "int"], &["c", "c"]],
            &[&["A1", "1"], &["B2", "2"], &["A1", "3"]],
        );
        let (result, target) = export(&source, &ExportOptions::default());
        match result.unwrap_err() {
            ExportError::Sheet {
                sheet, row, source, ..
            } => {
                assert_eq!(sheet, "Items");
                assert_eq!(row, Some(7));
                assert!(matches!(*source, ExportError::Data(_)));
            }
            other => panic!("Expected located data error, got {other:?}"),
        }
        // Rows before the failure stay written
        assert_eq!(
            target.contents("Items.tsv").unwrap(),
            "id\thp\nstring\tnumber\nA1\t1\nB2\t2\n"
        );
    }

    #[test]
    fn test_blank_and_idless_rows_are_skipped() {
        let source = sheet(
            [&["id", "hp"], &["string", "int"], &["c", "c"]],
            &[&["A1", "1"], &[], &["", "5"], &["B2", ""]],
        );
        let (result, target) = export(&source, &ExportOptions::default());
        assert_eq!(result.unwrap().unwrap().rows, 2);
        assert_eq!(
            target.contents("Items.tsv").unwrap(),
            "id\thp\nstring\tnumber\nA1\t1\nB2\t\n"
        );
    }

    #[test]
    fn test_field_count_matches_header() {
        let source = sheet(
            [
                &["id", "name", "pos.x", "pos.y", "tag", "tag", "desc", "ok"],
                &["string", "string", "number", "number", "string", "string", "translate", "bool"],
                &["c", "c", "c", "c", "c", "c", "c", "c"],
            ],
            &[&["A1", "Sword", "", "", "", "", "", ""], &["B2", "", "1", "", "x", "", "Shield", "true"]],
        );
        let (result, target) = export(&source, &ExportOptions::default());
        result.unwrap();
        let table = target.contents("Items.tsv").unwrap();
        let counts: Vec<usize> = table.lines().map(|l| l.split('\t').count()).collect();
        assert_eq!(counts, vec![6, 6, 6, 6]);
    }

    #[test]
    fn test_no_columns_in_scope_writes_nothing() {
        let source = sheet([&["id"], &["string"], &["s"]], &[&["A1"]]);
        let (result, target) = export(&source, &ExportOptions::default());
        assert_eq!(result.unwrap(), None);
        assert!(target.names().is_empty());
    }

    #[test]
    fn test_server_pass_uses_suffix() {
        let source = sheet([&["id"], &["string"], &["cs"]], &[&["A1"]]);
        let options = ExportOptions {
            scope: "s".to_string(),
            suffix: "_Server".to_string(),
            ..ExportOptions::default()
        };
        let (result, target) = export(&source, &options);
        result.unwrap();
        assert_eq!(target.names(), vec!["Items_Server.tsv"]);
    }

    #[test]
    fn test_translations_merge_localized_text() {
        let source = sheet(
            [&["id", "desc"], &["string", "translate"], &["c", "c"]],
            &[&["A1", "Hello"], &["B2", "Bye"]],
        );
        let mut entries = HashMap::new();
        entries.insert(
            "Items:desc:A1".to_string(),
            vec!["Hello".to_string(), "Bonjour".to_string(), "Hallo".to_string()],
        );
        let options = ExportOptions {
            languages: vec!["fr".to_string(), "de".to_string()],
            localized: Some(LocalizedText::new(entries)),
            ..ExportOptions::default()
        };
        let (result, target) = export(&source, &options);
        result.unwrap();
        assert_eq!(
            target.contents("Items_i18n.tsv").unwrap(),
            "id\tcn\tfr\tde\nstring\tstring\tstring\tstring\ndesc:A1\tHello\tBonjour\tHallo\ndesc:B2\tBye\t\t\n"
        );
    }

    #[test]
    fn test_number_error_names_column() {
        let source = sheet(
            [&["id", "hp"], &["string", "int"], &["c", "c"]],
            &[&["A1", "lots"]],
        );
        let (result, _) = export(&source, &ExportOptions::default());
        let err = result.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("row 5"), "got: {message}");
        assert!(message.contains("'hp'"), "got: {message}");
        assert!(message.contains("lots"), "got: {message}");
    }

    #[test]
    fn test_tab_in_value_is_rejected() {
        let mut source = sheet([&["id", "name"], &["string", "string"], &["c", "c"]], &[]);
        let mut row = Row::from_strings(&["A1"]);
        row.set(1, CellValue::text("a\tb"));
        source.rows.push(row);
        let (result, _) = export(&source, &ExportOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_export_is_deterministic() {
        let source = sheet(
            [&["id", "desc", "pos.x"], &["string", "translate", "number"], &["c", "c", "c"]],
            &[&["A1", "Hello", "1"], &["B2", "World", "2"]],
        );
        let (_, first) = export(&source, &ExportOptions::default());
        let (_, second) = export(&source, &ExportOptions::default());
        assert_eq!(first.contents("Items.tsv"), second.contents("Items.tsv"));
        assert_eq!(first.contents("Items_i18n.tsv"), second.contents("Items_i18n.tsv"));
    }
}
