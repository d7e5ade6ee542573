//! Domain models for budgetcheck

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An untyped spreadsheet cell, as delivered by the workbook or CSV reader
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// A cell holding a spreadsheet error such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// Build a cell from raw text, treating an empty string as an empty cell
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One data row of the uploaded ledger, keyed by required column
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub date: CellValue,
    pub name: CellValue,
    pub budget_type: CellValue,
    pub amount: CellValue,
    pub category: CellValue,
}

impl RawRow {
    /// A row whose every required cell is blank is dropped before validation
    pub fn is_blank(&self) -> bool {
        self.date.is_blank()
            && self.name.is_blank()
            && self.budget_type.is_blank()
            && self.amount.is_blank()
            && self.category.is_blank()
    }
}

/// A parsed ledger: the header row plus untyped data records
///
/// Columns are not yet matched to fields; the validator does that so that
/// schema problems are reported alongside capacity problems.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Vec<CellValue>>,
    /// Size of the source in bytes (0 when built in memory)
    pub byte_size: u64,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<Vec<CellValue>>) -> Self {
        Self {
            headers,
            records,
            byte_size: 0,
        }
    }

    pub fn with_byte_size(mut self, byte_size: u64) -> Self {
        self.byte_size = byte_size;
        self
    }
}

/// A row-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based position among retained data rows (header excluded)
    pub row_number: usize,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: {}", self.row_number, self.message)
    }
}

/// 50/30/20 budget bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetType {
    Needs,
    Wants,
    Savings,
}

impl BudgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "Needs",
            Self::Wants => "Wants",
            Self::Savings => "Savings",
        }
    }

    /// Target share of income for this bucket
    pub fn target_ratio(&self) -> f64 {
        match self {
            Self::Needs => 0.50,
            Self::Wants => 0.30,
            Self::Savings => 0.20,
        }
    }

    pub fn all() -> &'static [BudgetType] {
        &[Self::Needs, Self::Wants, Self::Savings]
    }
}

impl std::str::FromStr for BudgetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "needs" => Ok(Self::Needs),
            "wants" => Ok(Self::Wants),
            "savings" => Ok(Self::Savings),
            _ => Err(format!("Unknown budget type: {}", s)),
        }
    }
}

impl std::fmt::Display for BudgetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub name: String,
    pub budget_type: BudgetType,
    pub amount: Decimal,
    /// Category as the user wrote it; see [`Transaction::category_key`]
    pub category: String,
}

impl Transaction {
    /// Case-folded category used for grouping
    pub fn category_key(&self) -> String {
        self.category.to_lowercase()
    }
}

/// Bucket totals and the largest discretionary categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub needs_total: Decimal,
    pub wants_total: Decimal,
    pub savings_total: Decimal,
    /// Case-folded Wants categories, amount descending then name ascending
    pub top_discretionary: Vec<(String, Decimal)>,
}

impl BudgetBreakdown {
    pub fn total_for(&self, budget_type: BudgetType) -> Decimal {
        match budget_type {
            BudgetType::Needs => self.needs_total,
            BudgetType::Wants => self.wants_total,
            BudgetType::Savings => self.savings_total,
        }
    }

    pub fn tracked_total(&self) -> Decimal {
        self.needs_total + self.wants_total + self.savings_total
    }
}

/// Bucket that most needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Focus {
    Needs,
    Wants,
    Savings,
    None,
}

impl Focus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "reduce_needs",
            Self::Wants => "reduce_wants",
            Self::Savings => "increase_savings",
            Self::None => "none",
        }
    }
}

impl From<BudgetType> for Focus {
    fn from(budget_type: BudgetType) -> Self {
        match budget_type {
            BudgetType::Needs => Self::Needs,
            BudgetType::Wants => Self::Wants,
            BudgetType::Savings => Self::Savings,
        }
    }
}

impl std::fmt::Display for Focus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score bracket label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl StatusLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }

    /// Longer description used in the advisory payload
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent - Well-balanced budget",
            Self::Good => "Good - Room for optimization",
            Self::Fair => "Fair - Significant rebalancing needed",
            Self::Poor => "Poor - Urgent rebalancing needed",
        }
    }
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of the 50/30/20 health formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// 0..=100
    pub score: u8,
    pub needs_ratio: f64,
    pub wants_ratio: f64,
    pub savings_ratio: f64,
    /// Needs overspend beyond 50%, never negative
    pub needs_deviation: f64,
    /// Wants overspend beyond 30%, never negative
    pub wants_deviation: f64,
    /// Savings shortfall below 20%, never negative
    pub savings_deviation: f64,
    pub primary_focus: Focus,
    pub secondary_focus: Focus,
    pub status: StatusLabel,
}

/// Where the advice text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorySource {
    Generated,
    Fallback,
}

impl AdvisorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for AdvisorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final advice for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResult {
    /// Always the locally computed health score
    pub score: u8,
    pub advice: String,
    pub source: AdvisorySource,
}
