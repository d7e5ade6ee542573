//! Row validation
//!
//! Turns a parsed [`Dataset`] into either the ordered list of typed
//! transactions or the ordered list of row errors. A single row error rejects
//! the whole dataset; nothing partial is ever returned.
//!
//! Dataset-level problems (too many rows, too many bytes, missing columns)
//! are reported as [`Error`] values instead, before any row is looked at.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::coerce::{coerce_amount, coerce_category, coerce_date, coerce_name, coerce_type};
use crate::error::{Error, Result};
use crate::models::{CellValue, Dataset, RawRow, RowError, Transaction};

/// Most data rows accepted in one ledger (header excluded)
pub const MAX_ROWS: usize = 10_000;

/// Largest accepted upload, in bytes (5 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Largest accepted monthly income
pub const MAX_INCOME: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Required header names, in canonical order
pub const REQUIRED_COLUMNS: [&str; 5] = ["Date", "Name", "Type", "Amount", "Category"];

/// Outcome of validating a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    /// Every retained row coerced cleanly; input order preserved
    Accepted(Vec<Transaction>),
    /// At least one row failed; one entry per failing row, input order
    Rejected(Vec<RowError>),
}

impl Validated {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Positions of the required columns within a record
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    name: usize,
    budget_type: usize,
    amount: usize,
    category: usize,
}

impl ColumnMap {
    /// Match headers case-insensitively; extra columns are ignored
    fn resolve(headers: &[String]) -> Result<Self> {
        let position = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };

        let found: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|c| position(c)).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&found)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();

        match found.as_slice() {
            [Some(date), Some(name), Some(budget_type), Some(amount), Some(category)] => Ok(Self {
                date: *date,
                name: *name,
                budget_type: *budget_type,
                amount: *amount,
                category: *category,
            }),
            _ => Err(Error::Schema { missing }),
        }
    }

    fn project(&self, record: &[CellValue]) -> RawRow {
        let cell = |idx: usize| record.get(idx).cloned().unwrap_or(CellValue::Empty);
        RawRow {
            date: cell(self.date),
            name: cell(self.name),
            budget_type: cell(self.budget_type),
            amount: cell(self.amount),
            category: cell(self.category),
        }
    }
}

/// Reject datasets that exceed the row or byte limits
pub fn check_capacity(dataset: &Dataset) -> Result<()> {
    if dataset.byte_size > MAX_UPLOAD_BYTES {
        return Err(Error::Capacity(format!(
            "file is {} bytes, limit is {} bytes",
            dataset.byte_size, MAX_UPLOAD_BYTES
        )));
    }
    if dataset.records.len() > MAX_ROWS {
        return Err(Error::Capacity(format!(
            "{} rows, limit is {} rows",
            dataset.records.len(),
            MAX_ROWS
        )));
    }
    Ok(())
}

/// Coerce one row, stopping at the first failing field
///
/// Fields are checked in the order date, name, type, amount, category.
pub fn validate_row(row: &RawRow) -> std::result::Result<Transaction, &'static str> {
    let date = coerce_date(&row.date)?;
    let name = coerce_name(&row.name)?;
    let budget_type = coerce_type(&row.budget_type)?;
    let amount = coerce_amount(&row.amount)?;
    let category = coerce_category(&row.category)?;

    Ok(Transaction {
        date,
        name,
        budget_type,
        amount,
        category,
    })
}

/// Validate a whole dataset
///
/// Capacity is checked first, then the header. Fully blank rows are dropped
/// before numbering, so row numbers are 1-based over the retained rows.
pub fn validate_dataset(dataset: &Dataset) -> Result<Validated> {
    check_capacity(dataset)?;
    let columns = ColumnMap::resolve(&dataset.headers)?;

    let mut transactions = Vec::with_capacity(dataset.records.len());
    let mut errors = Vec::new();
    let mut dropped = 0usize;

    let rows = dataset
        .records
        .iter()
        .map(|record| columns.project(record))
        .filter(|row| {
            let blank = row.is_blank();
            if blank {
                dropped += 1;
            }
            !blank
        });

    for (idx, row) in rows.enumerate() {
        let row_number = idx + 1;
        match validate_row(&row) {
            Ok(tx) => transactions.push(tx),
            Err(message) => {
                debug!(row = row_number, reason = message, "Row rejected");
                errors.push(RowError {
                    row_number,
                    message: message.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        info!(
            rows = transactions.len(),
            blank_rows_dropped = dropped,
            "Ledger accepted"
        );
        Ok(Validated::Accepted(transactions))
    } else {
        info!(
            errors = errors.len(),
            blank_rows_dropped = dropped,
            "Ledger rejected"
        );
        Ok(Validated::Rejected(errors))
    }
}

/// Parse a monthly income string
///
/// Accepts plain or comma-grouped decimal text. Returns `None` for zero,
/// negative, non-numeric, or above [`MAX_INCOME`].
pub fn parse_income(input: &str) -> Option<Decimal> {
    let cleaned = input.trim().replace(',', "");
    let income = Decimal::from_str(&cleaned).ok()?;
    (income > Decimal::ZERO && income <= MAX_INCOME).then_some(income)
}

pub fn is_valid_income(input: &str) -> bool {
    parse_income(input).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetType;
    use chrono::NaiveDate;

    fn headers() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect()
    }

    fn record(date: &str, name: &str, ty: &str, amount: &str, category: &str) -> Vec<CellValue> {
        [date, name, ty, amount, category]
            .iter()
            .map(|s| CellValue::text(*s))
            .collect()
    }

    fn blank_record() -> Vec<CellValue> {
        record("", " ", "", "", "")
    }

    #[test]
    fn test_accepts_valid_rows_in_order() {
        let dataset = Dataset::new(
            headers(),
            vec![
                record("01/01/2026", "Rent", "Needs", "520.00", "Rent"),
                record("02/01/2026", "Cinema", "wants", "12.5", "Fun"),
            ],
        );

        let Validated::Accepted(txs) = validate_dataset(&dataset).unwrap() else {
            panic!("expected accepted");
        };
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].name, "Rent");
        assert_eq!(txs[0].amount, Decimal::new(52000, 2));
        assert_eq!(txs[1].budget_type, BudgetType::Wants);
        assert_eq!(txs[1].date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    }

    #[test]
    fn test_bad_date_in_third_row_reports_row_three() {
        let dataset = Dataset::new(
            headers(),
            vec![
                record("01/01/2026", "Rent", "Needs", "520", "Rent"),
                record("02/01/2026", "Bus", "Needs", "53", "Transport"),
                record("31/02/2026", "Gym", "Needs", "18.50", "Sports"),
            ],
        );

        let Validated::Rejected(errors) = validate_dataset(&dataset).unwrap() else {
            panic!("expected rejected");
        };
        assert_eq!(
            errors,
            vec![RowError {
                row_number: 3,
                message: "Invalid date format.".into()
            }]
        );
    }

    #[test]
    fn test_only_first_failing_field_reported() {
        // date is fine, name and amount are both bad: name wins
        let dataset = Dataset::new(headers(), vec![record("01/01/2026", "", "Needs", "-1", "")]);
        let Validated::Rejected(errors) = validate_dataset(&dataset).unwrap() else {
            panic!("expected rejected");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid name.");
    }

    #[test]
    fn test_blank_rows_dropped_before_numbering() {
        let dataset = Dataset::new(
            headers(),
            vec![
                record("01/01/2026", "Rent", "Needs", "520", "Rent"),
                blank_record(),
                record("03/01/2026", "Snacks", "Luxury", "4", "Food"),
            ],
        );
        let Validated::Rejected(errors) = validate_dataset(&dataset).unwrap() else {
            panic!("expected rejected");
        };
        assert_eq!(errors[0].row_number, 2);
        assert_eq!(errors[0].message, "Invalid type.");
    }

    #[test]
    fn test_all_blank_rows_is_empty_accept() {
        let dataset = Dataset::new(headers(), vec![blank_record(), blank_record()]);
        assert_eq!(
            validate_dataset(&dataset).unwrap(),
            Validated::Accepted(vec![])
        );
    }

    #[test]
    fn test_headers_case_insensitive_any_order_extras_ignored() {
        let headers = vec![
            "notes".to_string(),
            "CATEGORY".to_string(),
            " amount ".to_string(),
            "type".to_string(),
            "name".to_string(),
            "date".to_string(),
        ];
        let row = vec![
            CellValue::text("ignored"),
            CellValue::text("Rent"),
            CellValue::Number(520.0),
            CellValue::text("Needs"),
            CellValue::text("Rent"),
            CellValue::Int(46023),
        ];
        let dataset = Dataset::new(headers, vec![row]);
        let Validated::Accepted(txs) = validate_dataset(&dataset).unwrap() else {
            panic!("expected accepted");
        };
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(txs[0].amount, Decimal::from(520));
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let dataset = Dataset::new(
            vec!["Date".into(), "Title".into(), "Type".into(), "Amount".into()],
            vec![],
        );
        match validate_dataset(&dataset) {
            Err(Error::Schema { missing }) => {
                assert_eq!(missing, vec!["Name".to_string(), "Category".to_string()]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_records_read_as_empty_cells() {
        let dataset = Dataset::new(headers(), vec![vec![CellValue::text("01/01/2026")]]);
        let Validated::Rejected(errors) = validate_dataset(&dataset).unwrap() else {
            panic!("expected rejected");
        };
        assert_eq!(errors[0].message, "Invalid name.");
    }

    #[test]
    fn test_capacity_checked_before_schema() {
        let too_big = Dataset::new(vec![], vec![]).with_byte_size(MAX_UPLOAD_BYTES + 1);
        assert!(matches!(validate_dataset(&too_big), Err(Error::Capacity(_))));

        let too_many = Dataset::new(
            headers(),
            vec![record("01/01/2026", "a", "Needs", "1", "c"); MAX_ROWS + 1],
        );
        assert!(matches!(validate_dataset(&too_many), Err(Error::Capacity(_))));

        let at_limit = Dataset::new(
            headers(),
            vec![record("01/01/2026", "a", "Needs", "1", "c"); MAX_ROWS],
        )
        .with_byte_size(MAX_UPLOAD_BYTES);
        assert!(validate_dataset(&at_limit).unwrap().is_accepted());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let dataset = Dataset::new(
            headers(),
            vec![
                record("01/01/2026", "Rent", "Needs", "520", "Rent"),
                record("bad", "Bus", "Needs", "53", "Transport"),
            ],
        );
        assert_eq!(
            validate_dataset(&dataset).unwrap(),
            validate_dataset(&dataset).unwrap()
        );
    }

    #[test]
    fn test_income_parsing() {
        assert_eq!(parse_income("2000"), Some(Decimal::from(2000)));
        assert_eq!(parse_income(" 2,500.50 "), Some(Decimal::new(250050, 2)));
        assert_eq!(parse_income("1000000000"), Some(MAX_INCOME));
        assert_eq!(parse_income("1000000000.01"), None);
        assert!(!is_valid_income("0"));
        assert!(!is_valid_income("-100"));
        assert!(!is_valid_income("abc"));
        assert!(!is_valid_income(""));
        assert!(is_valid_income("0.01"));
    }
}
