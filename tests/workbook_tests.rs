//! Workbook round trips: xlsx written with rust_xlsxwriter, read back with
//! calamine, exported to a directory.

use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use sheetforge::excel::WorkbookReader;
use sheetforge::export::{DirectoryTarget, ExportOptions, ExportPass, SheetExporter};
use sheetforge::types::CellValue;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Items sheet: id, translated name, position object, tag array, server-only cost
fn write_items_workbook(path: &Path) {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Items").unwrap();
    let header: [[&str; 7]; 3] = [
        ["id", "name", "pos.x", "pos.y", "tag", "tag", "cost"],
        ["string", "translate", "number", "number", "string", "string", "int"],
        ["cs", "c", "cs", "cs", "c", "c", "s"],
    ];
    for (col, name) in header[0].iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (col, token) in header[1].iter().enumerate() {
        sheet.write_string(1, col as u16, *token).unwrap();
    }
    sheet.write_string(2, 0, "designer notes").unwrap();
    for (col, scope) in header[2].iter().enumerate() {
        sheet.write_string(3, col as u16, *scope).unwrap();
    }

    sheet.write_string(4, 0, "A1").unwrap();
    sheet.write_string(4, 1, "Sword").unwrap();
    sheet.write_number(4, 2, 1.0).unwrap();
    sheet.write_number(4, 3, 2.5).unwrap();
    sheet.write_string(4, 4, "red").unwrap();
    sheet.write_string(4, 5, "blue").unwrap();
    sheet.write_number(4, 6, 100.0).unwrap();

    sheet.write_string(6, 0, "A2").unwrap();
    sheet.write_string(6, 1, "Shield").unwrap();
    sheet.write_number(6, 2, 3.0).unwrap();
    sheet.write_number(6, 3, 4.0).unwrap();
    sheet.write_string(6, 4, "green").unwrap();
    sheet.write_number(6, 6, 250.0).unwrap();

    let ignored = workbook.add_worksheet();
    ignored.set_name("ignore_scratch").unwrap();
    ignored.write_string(0, 0, "not exported").unwrap();

    workbook.save(path).unwrap();
}

fn items_workbook() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Items.xlsx");
    write_items_workbook(&path);
    (temp, path)
}

#[test]
fn test_reader_skips_ignored_sheets() {
    let (_temp, path) = items_workbook();
    let sheets = WorkbookReader::new(&path).read().unwrap().sheets;
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "Items");
}

#[test]
fn test_reader_keeps_absolute_positions() {
    let (_temp, path) = items_workbook();
    let sheets = WorkbookReader::new(&path).read().unwrap().sheets;
    let items = &sheets[0];

    assert_eq!(items.row(0).unwrap().cell(0).header_text().as_deref(), Some("id"));
    assert_eq!(items.row(4).unwrap().cell(2), &CellValue::Number(1.0));
    assert!(items.row(5).map_or(true, |row| row.is_empty()));
    assert_eq!(items.row(6).unwrap().cell(0).header_text().as_deref(), Some("A2"));
}

#[test]
fn test_export_client_pass_from_workbook() {
    let (temp, path) = items_workbook();
    let sheets = WorkbookReader::new(&path).read().unwrap().sheets;
    let out = temp.path().join("Export");
    let mut target = DirectoryTarget::new(&out);

    let options = ExportOptions::default();
    let report = SheetExporter::new(&options)
        .export(&sheets[0], &mut target)
        .unwrap()
        .unwrap();
    assert_eq!(report.rows, 2);
    assert_eq!(report.translations, 2);

    assert_eq!(
        fs::read_to_string(out.join("Items.tsv")).unwrap(),
        "id\tname\tpos\ttag\n\
         string\ttranslate\tjson\tjson\n\
         A1\t\t{\"x\":1,\"y\":2.5}\t[\"red\",\"blue\"]\n\
         A2\t\t{\"x\":3,\"y\":4}\t[\"green\"]\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("Items_i18n.tsv")).unwrap(),
        "id\tcn\nstring\tstring\nname:A1\tSword\nname:A2\tShield\n"
    );
}

#[test]
fn test_export_server_pass_from_workbook() {
    let (temp, path) = items_workbook();
    let out = temp.path().join("Export");
    let mut target = DirectoryTarget::new(&out);

    let options = ExportOptions {
        scope: "s".to_string(),
        suffix: "_Server".to_string(),
        ..ExportOptions::default()
    };
    let report = ExportPass::new(&options).run(&[path], &mut target);
    assert!(report.succeeded());
    assert_eq!(report.sheets.len(), 1);

    assert_eq!(
        fs::read_to_string(out.join("Items_Server.tsv")).unwrap(),
        "id\tpos\tcost\nstring\tjson\tnumber\nA1\t{\"x\":1,\"y\":2.5}\t100\nA2\t{\"x\":3,\"y\":4}\t250\n"
    );
    assert!(!out.join("Items_Server_i18n.tsv").exists());
}
