//! Budget aggregation: per-bucket totals and top discretionary categories

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{BudgetBreakdown, BudgetType, Transaction};

/// Default length of the top discretionary list
pub const TOP_DISCRETIONARY_LIMIT: usize = 5;

/// Allowed range for a configured top-list length
pub const TOP_DISCRETIONARY_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

/// Sum amounts per bucket and rank Wants categories
///
/// `limit` is clamped into [`TOP_DISCRETIONARY_RANGE`]. Categories are grouped
/// by their case-folded name; the list is ordered by total descending, then
/// by name ascending.
pub fn aggregate(transactions: &[Transaction], limit: usize) -> BudgetBreakdown {
    let limit = limit.clamp(*TOP_DISCRETIONARY_RANGE.start(), *TOP_DISCRETIONARY_RANGE.end());

    let mut needs_total = Decimal::ZERO;
    let mut wants_total = Decimal::ZERO;
    let mut savings_total = Decimal::ZERO;
    let mut wants_by_category: BTreeMap<String, Decimal> = BTreeMap::new();

    for tx in transactions {
        match tx.budget_type {
            BudgetType::Needs => needs_total += tx.amount,
            BudgetType::Savings => savings_total += tx.amount,
            BudgetType::Wants => {
                wants_total += tx.amount;
                *wants_by_category
                    .entry(tx.category_key())
                    .or_insert(Decimal::ZERO) += tx.amount;
            }
        }
    }

    // BTreeMap iteration is name-ascending, and the sort is stable
    let mut top_discretionary: Vec<(String, Decimal)> = wants_by_category.into_iter().collect();
    top_discretionary.sort_by(|a, b| b.1.cmp(&a.1));
    top_discretionary.truncate(limit);

    BudgetBreakdown {
        needs_total,
        wants_total,
        savings_total,
        top_discretionary,
    }
}
