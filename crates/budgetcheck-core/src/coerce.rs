//! Field coercers
//!
//! Each coercer turns one raw cell into a typed value or a rejection message.
//! Rejections are plain data; nothing here panics or returns `crate::Error`.
//!
//! Dates are tried against an ordered list of strategies (see
//! [`DATE_STRATEGIES`]); the first one that yields a real calendar date wins.

use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{BudgetType, CellValue};

pub const EMPTY_DATE: &str = "Date is empty.";
pub const INVALID_DATE: &str = "Invalid date format.";
pub const INVALID_NAME: &str = "Invalid name.";
pub const INVALID_TYPE: &str = "Invalid type.";
pub const INVALID_AMOUNT: &str = "Invalid amount.";
pub const INVALID_CATEGORY: &str = "Invalid category.";

/// Longest accepted name or category, in characters
pub const MAX_TEXT_LEN: usize = 150;

/// Most fractional digits an amount may carry
pub const MAX_AMOUNT_SCALE: u32 = 3;

/// Largest accepted amount (999999.999)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 3);

/// Largest spreadsheet serial accepted as a date (9999-12-31)
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// A coercion outcome: typed value or the user-facing rejection message
pub type Coerced<T> = std::result::Result<T, &'static str>;

/// A named date parser tried in order by [`coerce_date`]
pub type DateStrategy = (&'static str, fn(&CellValue) -> Option<NaiveDate>);

/// Date strategies, in priority order
pub const DATE_STRATEGIES: &[DateStrategy] = &[
    ("native", parse_native_date),
    ("serial", parse_serial_date),
    ("day/month/year", parse_slash_date),
    ("day-month-year", parse_dash_date),
];

/// Native date or datetime cells
pub fn parse_native_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::DateTime(dt) => Some(dt.date()),
        _ => None,
    }
}

/// Spreadsheet serial numbers: whole days since 1899-12-30
///
/// Any time-of-day fraction is discarded.
pub fn parse_serial_date(cell: &CellValue) -> Option<NaiveDate> {
    let serial = match cell {
        CellValue::Number(f) => *f,
        CellValue::Int(i) => *i as f64,
        _ => return None,
    };
    if !serial.is_finite() || !(0.0..=MAX_SERIAL_DAY).contains(&serial) {
        return None;
    }
    spreadsheet_epoch()?.checked_add_days(Days::new(serial.floor() as u64))
}

/// Text in `dd/mm/yyyy` form
pub fn parse_slash_date(cell: &CellValue) -> Option<NaiveDate> {
    parse_text_date(cell, "%d/%m/%Y")
}

/// Text in `dd-mm-yyyy` form
pub fn parse_dash_date(cell: &CellValue) -> Option<NaiveDate> {
    parse_text_date(cell, "%d-%m-%Y")
}

fn parse_text_date(cell: &CellValue, format: &str) -> Option<NaiveDate> {
    match cell {
        CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), format).ok(),
        _ => None,
    }
}

/// Day zero of the spreadsheet serial calendar (accounts for the 1900 leap-year bug)
fn spreadsheet_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

pub fn coerce_date(cell: &CellValue) -> Coerced<NaiveDate> {
    if cell.is_blank() {
        return Err(EMPTY_DATE);
    }
    DATE_STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(cell))
        .ok_or(INVALID_DATE)
}

pub fn coerce_name(cell: &CellValue) -> Coerced<String> {
    bounded_text(cell).ok_or(INVALID_NAME)
}

pub fn coerce_type(cell: &CellValue) -> Coerced<BudgetType> {
    match cell {
        CellValue::Text(s) => s.parse().map_err(|_| INVALID_TYPE),
        _ => Err(INVALID_TYPE),
    }
}

pub fn coerce_amount(cell: &CellValue) -> Coerced<Decimal> {
    let text = match cell {
        CellValue::Number(f) if f.is_finite() => f.to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Text(s) => s.trim().replace(',', ""),
        _ => return Err(INVALID_AMOUNT),
    };

    let amount = Decimal::from_str(&text).map_err(|_| INVALID_AMOUNT)?;
    if amount <= Decimal::ZERO || amount.scale() > MAX_AMOUNT_SCALE || amount > MAX_AMOUNT {
        return Err(INVALID_AMOUNT);
    }
    Ok(amount)
}

pub fn coerce_category(cell: &CellValue) -> Coerced<String> {
    bounded_text(cell).ok_or(INVALID_CATEGORY)
}

/// Trimmed, non-empty text of at most [`MAX_TEXT_LEN`] characters
fn bounded_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => {
            let s = s.trim();
            (!s.is_empty() && s.chars().count() <= MAX_TEXT_LEN).then(|| s.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_native_date_strategy() {
        let dt = ymd(2026, 3, 4).and_hms_opt(13, 30, 0).unwrap();
        assert_eq!(parse_native_date(&CellValue::DateTime(dt)), Some(ymd(2026, 3, 4)));
        assert_eq!(parse_native_date(&CellValue::Date(ymd(2026, 3, 4))), Some(ymd(2026, 3, 4)));
        assert_eq!(parse_native_date(&text("04/03/2026")), None);
    }

    #[test]
    fn test_serial_date_strategy() {
        // 45658 is 2025-01-01 in spreadsheet serial form
        assert_eq!(parse_serial_date(&CellValue::Int(45658)), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_serial_date(&CellValue::Number(45658.75)), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_serial_date(&CellValue::Number(-1.0)), None);
        assert_eq!(parse_serial_date(&CellValue::Number(f64::NAN)), None);
        assert_eq!(parse_serial_date(&CellValue::Number(1e12)), None);
        assert_eq!(parse_serial_date(&text("45658")), None);
    }

    #[test]
    fn test_slash_date_strategy_is_day_first() {
        assert_eq!(parse_slash_date(&text("02/01/2026")), Some(ymd(2026, 1, 2)));
        assert_eq!(parse_slash_date(&text(" 1/1/2026 ")), Some(ymd(2026, 1, 1)));
        assert_eq!(parse_slash_date(&text("02-01-2026")), None);
    }

    #[test]
    fn test_dash_date_strategy() {
        assert_eq!(parse_dash_date(&text("15-08-2025")), Some(ymd(2025, 8, 15)));
        assert_eq!(parse_dash_date(&text("15/08/2025")), None);
    }

    #[test]
    fn test_coerce_date_rejects_impossible_dates() {
        assert_eq!(coerce_date(&text("31/02/2026")), Err(INVALID_DATE));
        assert_eq!(coerce_date(&text("13/13/2026")), Err(INVALID_DATE));
        assert_eq!(coerce_date(&text("2026-01-15")), Err(INVALID_DATE));
        assert_eq!(coerce_date(&text("yesterday")), Err(INVALID_DATE));
        assert_eq!(coerce_date(&CellValue::Bool(true)), Err(INVALID_DATE));
    }

    #[test]
    fn test_coerce_date_empty() {
        assert_eq!(coerce_date(&CellValue::Empty), Err(EMPTY_DATE));
        assert_eq!(coerce_date(&text("  ")), Err(EMPTY_DATE));
    }

    #[test]
    fn test_coerce_amount_accepts_thousands_separators() {
        assert_eq!(coerce_amount(&text("1,234.50")), Ok(Decimal::new(123450, 2)));
        assert_eq!(coerce_amount(&text("10.999")), Ok(Decimal::new(10999, 3)));
        assert_eq!(coerce_amount(&CellValue::Int(42)), Ok(Decimal::from(42)));
        assert_eq!(coerce_amount(&CellValue::Number(7.5)), Ok(Decimal::new(75, 1)));
    }

    #[test]
    fn test_coerce_amount_rejections() {
        assert_eq!(coerce_amount(&text("10.1234")), Err(INVALID_AMOUNT));
        assert_eq!(coerce_amount(&CellValue::Number(0.0001)), Err(INVALID_AMOUNT));
        assert_eq!(coerce_amount(&text("0")), Err(INVALID_AMOUNT));
        assert_eq!(coerce_amount(&text("-5")), Err(INVALID_AMOUNT));
        assert_eq!(coerce_amount(&text("abc")), Err(INVALID_AMOUNT));
        assert_eq!(coerce_amount(&CellValue::Number(f64::INFINITY)), Err(INVALID_AMOUNT));
        assert_eq!(coerce_amount(&CellValue::Empty), Err(INVALID_AMOUNT));
    }

    #[test]
    fn test_coerce_amount_upper_bound() {
        assert_eq!(coerce_amount(&text("999999.999")), Ok(MAX_AMOUNT));
        assert_eq!(coerce_amount(&text("1000000")), Err(INVALID_AMOUNT));
        assert_eq!(coerce_amount(&CellValue::Number(1e21)), Err(INVALID_AMOUNT));
    }

    #[test]
    fn test_coerce_name() {
        assert_eq!(coerce_name(&text("  Rent ")), Ok("Rent".to_string()));
        assert_eq!(coerce_name(&text("Trader Joe's")), Ok("Trader Joe's".to_string()));
        assert_eq!(coerce_name(&text("")), Err(INVALID_NAME));
        assert_eq!(coerce_name(&CellValue::Number(12.0)), Err(INVALID_NAME));
        assert_eq!(coerce_name(&text(&"x".repeat(150))).map(|s| s.len()), Ok(150));
        assert_eq!(coerce_name(&text(&"x".repeat(151))), Err(INVALID_NAME));
    }

    #[test]
    fn test_coerce_type() {
        assert_eq!(coerce_type(&text("needs")), Ok(BudgetType::Needs));
        assert_eq!(coerce_type(&text("Savings")), Ok(BudgetType::Savings));
        assert_eq!(coerce_type(&text("Luxury")), Err(INVALID_TYPE));
        assert_eq!(coerce_type(&CellValue::Int(1)), Err(INVALID_TYPE));
    }

    #[test]
    fn test_coerce_category() {
        assert_eq!(coerce_category(&text("Eating-Out")), Ok("Eating-Out".to_string()));
        assert_eq!(coerce_category(&CellValue::Empty), Err(INVALID_CATEGORY));
        assert_eq!(coerce_category(&text(&"c".repeat(151))), Err(INVALID_CATEGORY));
    }
}
