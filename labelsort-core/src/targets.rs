//! Target list: the ordered barcodes the output must follow
//!
//! Targets come from the first worksheet of a spreadsheet or from a CSV
//! file. Two columns are required, looked up by header name; every other
//! column is ignored.

use crate::error::{Result, SortError};
use calamine::{Data, Ods, Range, Reader, Xls, Xlsb, Xlsx};
use serde::Serialize;
use std::fmt::Display;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// One requested label, in sheet order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetEntry {
    /// Trimmed, upper-cased barcode
    pub identifier: String,
    /// Carton code carried alongside the barcode
    pub destination_key: String,
    /// 0-based rank of the row in the table
    pub sequence_position: usize,
}

/// Header names of the two required columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetColumns {
    pub identifier: String,
    pub destination_key: String,
}

impl Default for TargetColumns {
    fn default() -> Self {
        Self {
            identifier: "label_bar_code".to_string(),
            destination_key: "carton_code".to_string(),
        }
    }
}

impl TargetColumns {
    pub fn new(identifier: impl Into<String>, destination_key: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            destination_key: destination_key.into(),
        }
    }
}

/// Supported tabular formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Office Open XML workbook (`.xlsx`, `.xlsm`)
    Xlsx,
    /// Binary workbook (`.xlsb`)
    Xlsb,
    /// Legacy workbook (`.xls`)
    Xls,
    /// OpenDocument spreadsheet (`.ods`)
    Ods,
    Csv,
}

impl TableFormat {
    /// Pick the format from the file extension, falling back to the content
    pub fn detect(path: Option<&Path>, bytes: &[u8]) -> Self {
        let extension = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx" | "xlsm") => TableFormat::Xlsx,
            Some("xlsb") => TableFormat::Xlsb,
            Some("xls") => TableFormat::Xls,
            Some("ods") => TableFormat::Ods,
            Some("csv" | "txt") => TableFormat::Csv,
            _ => Self::sniff(bytes),
        }
    }

    fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"PK\x03\x04") {
            TableFormat::Xlsx
        } else if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            TableFormat::Xls
        } else {
            TableFormat::Csv
        }
    }
}

/// A header row and the data rows under it, all cells as strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a table file, detecting its format
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let format = TableFormat::detect(Some(path), &bytes);
        tracing::debug!("Reading {} as {:?}", path.display(), format);
        Self::from_bytes(bytes, format)
    }

    /// Parse table data already in memory
    pub fn from_bytes(bytes: Vec<u8>, format: TableFormat) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        match format {
            TableFormat::Csv => Self::from_csv(cursor),
            TableFormat::Xlsx => Self::from_workbook(Xlsx::new(cursor).map_err(spreadsheet_error)?),
            TableFormat::Xlsb => Self::from_workbook(Xlsb::new(cursor).map_err(spreadsheet_error)?),
            TableFormat::Xls => Self::from_workbook(Xls::new(cursor).map_err(spreadsheet_error)?),
            TableFormat::Ods => Self::from_workbook(Ods::new(cursor).map_err(spreadsheet_error)?),
        }
    }

    /// Read CSV with a required header row
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// First worksheet; its first row holds the headers
    fn from_workbook<RS, R>(mut workbook: R) -> Result<Self>
    where
        RS: Read + Seek,
        R: Reader<RS>,
        R::Error: Display,
    {
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SortError::Spreadsheet("workbook has no worksheets".to_string()))?
            .map_err(spreadsheet_error)?;
        Ok(Self::from_range(&range))
    }

    fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();
        Self::new(headers, rows.collect())
    }

    /// Position of the column whose header matches `name`
    fn column(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase() == wanted)
    }
}

fn spreadsheet_error<E: Display>(err: E) -> SortError {
    SortError::Spreadsheet(err.to_string())
}

/// String form of a spreadsheet cell.
///
/// Floats print without a fractional part when they are whole, so a barcode
/// stored as a number reads back as its digits.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Ordered targets built from a table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetList {
    entries: Vec<TargetEntry>,
}

impl TargetList {
    /// Build targets from a table.
    ///
    /// Fails with [`SortError::Schema`] when either required column is
    /// missing. Rows with no content at all are skipped.
    pub fn from_table(table: &Table, columns: &TargetColumns) -> Result<Self> {
        let id_col = table.column(&columns.identifier);
        let key_col = table.column(&columns.destination_key);

        let (Some(id_col), Some(key_col)) = (id_col, key_col) else {
            let mut missing = Vec::new();
            if id_col.is_none() {
                missing.push(columns.identifier.clone());
            }
            if key_col.is_none() {
                missing.push(columns.destination_key.clone());
            }
            return Err(SortError::Schema {
                missing,
                found: table.headers.iter().map(|h| h.trim().to_string()).collect(),
            });
        };

        let mut entries = Vec::new();
        for row in &table.rows {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let cell = |i: usize| row.get(i).map(|c| c.trim()).unwrap_or_default();
            entries.push(TargetEntry {
                identifier: cell(id_col).to_uppercase(),
                destination_key: cell(key_col).to_string(),
                sequence_position: entries.len(),
            });
        }

        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<TargetEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TargetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TargetEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<TargetEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a TargetList {
    type Item = &'a TargetEntry;
    type IntoIter = std::slice::Iter<'a, TargetEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Load and validate the target list of a table file
pub fn load_targets<P: AsRef<Path>>(path: P, columns: &TargetColumns) -> Result<TargetList> {
    let table = Table::from_path(path)?;
    let targets = TargetList::from_table(&table, columns)?;
    tracing::info!("Loaded {} target(s)", targets.len());
    Ok(targets)
}

#[cfg(test)]
#[path = "targets_tests.rs"]
mod targets_tests;
