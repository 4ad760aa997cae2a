//! Tests for target list loading

use super::*;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    Table::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn entry(identifier: &str, key: &str, position: usize) -> TargetEntry {
    TargetEntry {
        identifier: identifier.to_string(),
        destination_key: key.to_string(),
        sequence_position: position,
    }
}

#[test]
fn test_targets_follow_row_order() {
    let table = table(
        &["label_bar_code", "carton_code", "qty"],
        &[&[" abc ", " C1 ", "3"], &["def", "C2", "1"], &["abc", "C3", "1"]],
    );
    let targets = TargetList::from_table(&table, &TargetColumns::default()).unwrap();

    assert_eq!(
        targets.entries(),
        &[entry("ABC", "C1", 0), entry("DEF", "C2", 1), entry("ABC", "C3", 2)]
    );
}

#[test]
fn test_headers_match_case_insensitively() {
    let table = table(&[" Carton_Code", "LABEL_BAR_CODE "], &[&["K", "x1"]]);
    let targets = TargetList::from_table(&table, &TargetColumns::default()).unwrap();
    assert_eq!(targets.entries(), &[entry("X1", "K", 0)]);
}

#[test]
fn test_custom_columns() {
    let table = table(&["barcode", "box"], &[&["z9", "B7"]]);
    let columns = TargetColumns::new("Barcode", "Box");
    let targets = TargetList::from_table(&table, &columns).unwrap();
    assert_eq!(targets.entries(), &[entry("Z9", "B7", 0)]);
}

#[test]
fn test_missing_column_is_schema_error() {
    let table = table(&["label_bar_code", "qty"], &[&["A", "1"]]);
    match TargetList::from_table(&table, &TargetColumns::default()) {
        Err(SortError::Schema { missing, found }) => {
            assert_eq!(missing, vec!["carton_code".to_string()]);
            assert_eq!(found, vec!["label_bar_code".to_string(), "qty".to_string()]);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn test_both_columns_missing() {
    let table = table(&[], &[]);
    match TargetList::from_table(&table, &TargetColumns::default()) {
        Err(SortError::Schema { missing, .. }) => assert_eq!(missing.len(), 2),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn test_blank_rows_are_skipped_and_short_rows_padded() {
    let table = table(
        &["label_bar_code", "carton_code"],
        &[&["A", "1"], &["", " "], &["B"], &[" ", "K"]],
    );
    let targets = TargetList::from_table(&table, &TargetColumns::default()).unwrap();
    assert_eq!(
        targets.entries(),
        &[entry("A", "1", 0), entry("B", "", 1), entry("", "K", 2)]
    );
}

#[test]
fn test_csv_loading() {
    let data = "label_bar_code,carton_code\n123456789012345678,C-01\nfba15x7,C-02\n";
    let table = Table::from_csv(data.as_bytes()).unwrap();
    assert_eq!(table.headers, vec!["label_bar_code", "carton_code"]);
    assert_eq!(table.rows.len(), 2);

    let targets = TargetList::from_table(&table, &TargetColumns::default()).unwrap();
    assert_eq!(targets.entries()[1].identifier, "FBA15X7");
}

#[test]
fn test_csv_with_byte_order_mark() {
    let data = "\u{feff}label_bar_code,carton_code\nA,1\n";
    let table = Table::from_csv(data.as_bytes()).unwrap();
    let targets = TargetList::from_table(&table, &TargetColumns::default()).unwrap();
    assert_eq!(targets.len(), 1);
}

#[test]
fn test_load_targets_from_file() {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "carton_code,label_bar_code").unwrap();
    writeln!(file, "K1,111").unwrap();
    writeln!(file, "K2,222").unwrap();
    file.flush().unwrap();

    let targets = load_targets(file.path(), &TargetColumns::default()).unwrap();
    let ids: Vec<&str> = targets.iter().map(|t| t.identifier.as_str()).collect();
    assert_eq!(ids, vec!["111", "222"]);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let result = load_targets("/nonexistent/targets.csv", &TargetColumns::default());
    assert!(matches!(result, Err(SortError::Io(_))));
}

#[test]
fn test_corrupt_workbook_is_spreadsheet_error() {
    let result = Table::from_bytes(b"PK\x03\x04 not really a zip".to_vec(), TableFormat::Xlsx);
    assert!(matches!(result, Err(SortError::Spreadsheet(_))));
}

const ORDER_XLSX: &[u8] = include_bytes!("../tests/fixtures/order.xlsx");

#[test]
fn test_xlsx_workbook_loading() {
    let table = Table::from_bytes(ORDER_XLSX.to_vec(), TableFormat::Xlsx).unwrap();
    assert_eq!(table.headers, vec!["label_bar_code", "carton_code"]);

    let targets = TargetList::from_table(&table, &TargetColumns::default()).unwrap();
    assert_eq!(
        targets.entries(),
        &[entry("ABC", "C1", 0), entry("120000", "7", 1), entry("DEF", "C3", 2)]
    );
}

#[test]
fn test_load_targets_from_xlsx_file() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/order.xlsx");
    assert_eq!(TableFormat::detect(None, ORDER_XLSX), TableFormat::Xlsx);

    let targets = load_targets(&path, &TargetColumns::default()).unwrap();
    assert_eq!(targets.len(), 3);
    assert_eq!(targets.entries()[1], entry("120000", "7", 1));
}

#[test]
fn test_format_detection() {
    use std::path::Path;

    assert_eq!(
        TableFormat::detect(Some(Path::new("t.XLSX")), b""),
        TableFormat::Xlsx
    );
    assert_eq!(
        TableFormat::detect(Some(Path::new("t.ods")), b""),
        TableFormat::Ods
    );
    assert_eq!(
        TableFormat::detect(Some(Path::new("t.csv")), b"PK\x03\x04"),
        TableFormat::Csv
    );
    assert_eq!(TableFormat::detect(None, b"PK\x03\x04rest"), TableFormat::Xlsx);
    assert_eq!(
        TableFormat::detect(Some(Path::new("upload")), &[0xD0, 0xCF, 0x11, 0xE0, 0xA1]),
        TableFormat::Xls
    );
    assert_eq!(TableFormat::detect(None, b"a,b\n1,2"), TableFormat::Csv);
}

#[test]
fn test_cell_to_string() {
    assert_eq!(cell_to_string(&Data::Empty), "");
    assert_eq!(cell_to_string(&Data::String("x".to_string())), "x");
    assert_eq!(cell_to_string(&Data::Int(42)), "42");
    assert_eq!(cell_to_string(&Data::Float(120000.0)), "120000");
    assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
    assert_eq!(cell_to_string(&Data::Bool(true)), "true");
}

#[test]
fn test_table_from_range_uses_first_row_as_headers() {
    let mut range = Range::new((0, 0), (2, 1));
    range.set_value((0, 0), Data::String("label_bar_code".to_string()));
    range.set_value((0, 1), Data::String("carton_code".to_string()));
    range.set_value((1, 0), Data::Float(123456789012.0));
    range.set_value((1, 1), Data::Int(7));

    let table = Table::from_range(&range);
    assert_eq!(table.headers, vec!["label_bar_code", "carton_code"]);
    assert_eq!(
        table.rows,
        vec![
            vec!["123456789012".to_string(), "7".to_string()],
            vec![String::new(), String::new()],
        ]
    );

    let targets = TargetList::from_table(&table, &TargetColumns::default()).unwrap();
    assert_eq!(targets.entries(), &[entry("123456789012", "7", 0)]);
}
