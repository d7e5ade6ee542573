//! Ad-hoc scoring command

use anyhow::{bail, Result};
use budgetcheck_core::validate::MAX_INCOME;
use budgetcheck_core::{compute_health_score, HealthScore};
use rust_decimal::Decimal;

use super::percent;

pub fn cmd_score(income: f64, needs: f64, wants: f64, savings: f64) -> Result<()> {
    let health = score_numbers(income, needs, wants, savings)?;

    println!();
    println!("📊 Health Score");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Needs {}  Wants {}  Savings {}",
        percent(health.needs_ratio),
        percent(health.wants_ratio),
        percent(health.savings_ratio)
    );
    println!(
        "   Score: {}/100 ({})",
        health.score,
        health.status.description()
    );
    println!(
        "   Focus: {}, then {}",
        health.primary_focus, health.secondary_focus
    );
    println!();
    Ok(())
}

/// Score four numbers, rejecting an income the ledger flow would reject
///
/// Income must be finite, above zero and at most [`MAX_INCOME`].
pub fn score_numbers(income: f64, needs: f64, wants: f64, savings: f64) -> Result<HealthScore> {
    let in_range = Decimal::from_f64_retain(income)
        .is_some_and(|d| d > Decimal::ZERO && d <= MAX_INCOME);
    if !in_range {
        bail!("Income must be greater than 0 and at most {}", MAX_INCOME);
    }
    Ok(compute_health_score(income, needs, wants, savings))
}
