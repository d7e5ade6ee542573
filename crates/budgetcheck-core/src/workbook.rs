//! Ledger file readers
//!
//! Reads the first sheet of a spreadsheet (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`,
//! `.ods`) or a `.csv` file into an untyped [`Dataset`]. Header matching and
//! row checks happen later in [`crate::validate`].

use std::io::{Read, Write};
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{CellValue, Dataset};
use crate::validate::{MAX_UPLOAD_BYTES, REQUIRED_COLUMNS};

/// Supported ledger containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFormat {
    Spreadsheet,
    Csv,
}

impl LedgerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Csv => "csv",
        }
    }

    /// Detect the format from the file extension
    ///
    /// Returns None if the extension is missing or not recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

impl std::fmt::Display for LedgerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read a ledger file, choosing the parser from its extension
///
/// Files over [`MAX_UPLOAD_BYTES`] are refused before they are opened.
pub fn read_ledger(path: &Path) -> Result<Dataset> {
    let format = LedgerFormat::from_path(path)
        .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;

    let byte_size = std::fs::metadata(path)?.len();
    if byte_size > MAX_UPLOAD_BYTES {
        return Err(Error::Capacity(format!(
            "file is {} bytes, limit is {} bytes",
            byte_size, MAX_UPLOAD_BYTES
        )));
    }

    let dataset = match format {
        LedgerFormat::Spreadsheet => read_spreadsheet(path)?,
        LedgerFormat::Csv => read_csv(std::fs::File::open(path)?)?,
    };

    debug!(
        format = %format,
        rows = dataset.records.len(),
        columns = dataset.headers.len(),
        "Ledger read"
    );
    Ok(dataset.with_byte_size(byte_size))
}

/// Read the first sheet of a spreadsheet workbook
pub fn read_spreadsheet(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Workbook("workbook has no sheets".into()))??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => Vec::new(),
    };
    let records = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(Dataset::new(headers, records))
}

/// Read a CSV ledger; every cell arrives as text
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        records.push(record.iter().map(CellValue::text).collect());
    }

    Ok(Dataset::new(headers, records))
}

fn header_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Map a calamine cell onto the ledger's cell model
pub fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => data
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Error("unreadable date".into())),
        Data::DateTimeIso(s) => parse_iso(s),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// ISO dates from OpenDocument sheets
fn parse_iso(s: &str) -> CellValue {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return CellValue::Date(d);
    }
    CellValue::text(s)
}

/// Example rows shipped in the downloadable ledger template
pub const TEMPLATE_ROWS: [[&str; 5]; 10] = [
    ["01/01/2026", "Rent", "Needs", "520.00", "Rent"],
    ["02/01/2026", "all you can eat DAIU", "Wants", "50.00", "Eating Out"],
    ["03/01/2026", "Investments", "Savings", "430.00", "Gold Investment"],
    ["04/01/2026", "Electricity Bills", "Needs", "4.20", "Electricity"],
    ["05/01/2026", "Thai Grass", "Wants", "7.50", "Eating Out"],
    ["06/01/2026", "NX Bus Pass", "Needs", "53.00", "Bus Pass"],
    ["07/01/2026", "Aldi Week 1", "Needs", "16.00", "Groceries"],
    ["08/01/2026", "Kebab Rush", "Wants", "6.50", "Eating Out"],
    ["09/01/2026", "Stocks Investment", "Savings", "20.00", "Stocks"],
    ["10/01/2026", "Gym Subscription", "Needs", "18.50", "Sports"],
];

/// Write the ledger template (header plus example rows) as CSV
pub fn write_template_csv<W: Write>(writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(REQUIRED_COLUMNS)?;
    for row in TEMPLATE_ROWS {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
