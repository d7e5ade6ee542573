//! 50/30/20 health score
//!
//! Pure functions: the same income and bucket totals always give the same
//! score, deviations and focus areas.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{BudgetBreakdown, BudgetType, Focus, HealthScore, StatusLabel};

/// Penalty weight per unit of Needs overspend
const NEEDS_WEIGHT: f64 = 0.2;
/// Penalty weight per unit of Wants overspend
const WANTS_WEIGHT: f64 = 0.5;
/// Penalty weight per unit of Savings shortfall
const SAVINGS_WEIGHT: f64 = 0.6;

/// Needs share above which the flat penalty applies
const NEEDS_CEILING: f64 = 0.75;
const NEEDS_CEILING_PENALTY: f64 = 10.0;

/// Score an analysis from its income and aggregated buckets
///
/// Ratios and deviations are taken in exact decimal arithmetic so a ledger
/// that hits the targets exactly has no deviation and no focus area.
pub fn score_breakdown(income: Decimal, breakdown: &BudgetBreakdown) -> HealthScore {
    if income <= Decimal::ZERO {
        return degenerate_score();
    }
    let ratio = |total: Decimal| total.checked_div(income);
    let (Some(needs_ratio), Some(wants_ratio), Some(savings_ratio)) = (
        ratio(breakdown.needs_total),
        ratio(breakdown.wants_total),
        ratio(breakdown.savings_total),
    ) else {
        return degenerate_score();
    };

    let needs_deviation = (needs_ratio - decimal_target(BudgetType::Needs)).max(Decimal::ZERO);
    let wants_deviation = (wants_ratio - decimal_target(BudgetType::Wants)).max(Decimal::ZERO);
    let savings_deviation =
        (decimal_target(BudgetType::Savings) - savings_ratio).max(Decimal::ZERO);

    let as_f64 = |d: Decimal| d.to_f64().unwrap_or(f64::NAN);
    finish_score(Shares {
        needs_ratio: as_f64(needs_ratio),
        wants_ratio: as_f64(wants_ratio),
        savings_ratio: as_f64(savings_ratio),
        needs_deviation: as_f64(needs_deviation),
        wants_deviation: as_f64(wants_deviation),
        savings_deviation: as_f64(savings_deviation),
        savings_negative: breakdown.savings_total < Decimal::ZERO,
        over_needs_ceiling: needs_ratio > Decimal::new(75, 2),
    })
}

/// Score raw bucket totals against an income
///
/// Income that is zero, negative or not finite yields a zero score with no
/// focus areas; the same goes for non-finite bucket totals.
pub fn compute_health_score(income: f64, needs: f64, wants: f64, savings: f64) -> HealthScore {
    let inputs_finite = [income, needs, wants, savings].iter().all(|v| v.is_finite());
    if !inputs_finite || income <= 0.0 {
        return degenerate_score();
    }

    let needs_ratio = needs / income;
    let wants_ratio = wants / income;
    let savings_ratio = savings / income;

    finish_score(Shares {
        needs_ratio,
        wants_ratio,
        savings_ratio,
        needs_deviation: (needs_ratio - BudgetType::Needs.target_ratio()).max(0.0),
        wants_deviation: (wants_ratio - BudgetType::Wants.target_ratio()).max(0.0),
        savings_deviation: (BudgetType::Savings.target_ratio() - savings_ratio).max(0.0),
        savings_negative: savings < 0.0,
        over_needs_ceiling: needs_ratio > NEEDS_CEILING,
    })
}

/// Bucket shares of income, with deviations already clamped at zero
struct Shares {
    needs_ratio: f64,
    wants_ratio: f64,
    savings_ratio: f64,
    needs_deviation: f64,
    wants_deviation: f64,
    savings_deviation: f64,
    savings_negative: bool,
    over_needs_ceiling: bool,
}

fn finish_score(shares: Shares) -> HealthScore {
    let mut raw = 100.0
        * (1.0
            - (NEEDS_WEIGHT * shares.needs_deviation
                + WANTS_WEIGHT * shares.wants_deviation
                + SAVINGS_WEIGHT * shares.savings_deviation));
    if shares.savings_negative {
        raw = 0.0;
    }
    if shares.over_needs_ceiling {
        raw -= NEEDS_CEILING_PENALTY;
    }
    let score = raw.clamp(0.0, 100.0).round() as u8;

    let (primary_focus, secondary_focus) = rank_focus(
        shares.needs_deviation,
        shares.wants_deviation,
        shares.savings_deviation,
    );

    HealthScore {
        score,
        needs_ratio: shares.needs_ratio,
        wants_ratio: shares.wants_ratio,
        savings_ratio: shares.savings_ratio,
        needs_deviation: shares.needs_deviation,
        wants_deviation: shares.wants_deviation,
        savings_deviation: shares.savings_deviation,
        primary_focus,
        secondary_focus,
        status: StatusLabel::from_score(score),
    }
}

/// Target share as an exact decimal: 0.5, 0.3 or 0.2
fn decimal_target(budget_type: BudgetType) -> Decimal {
    match budget_type {
        BudgetType::Needs => Decimal::new(5, 1),
        BudgetType::Wants => Decimal::new(3, 1),
        BudgetType::Savings => Decimal::new(2, 1),
    }
}

/// Largest and second-largest non-zero deviations
///
/// Ties keep the bucket order Needs, Wants, Savings.
fn rank_focus(needs: f64, wants: f64, savings: f64) -> (Focus, Focus) {
    let mut ranked = [
        (BudgetType::Needs, needs),
        (BudgetType::Wants, wants),
        (BudgetType::Savings, savings),
    ];
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut nonzero = ranked
        .iter()
        .filter(|(_, deviation)| *deviation > 0.0)
        .map(|(budget_type, _)| Focus::from(*budget_type));

    let primary = nonzero.next().unwrap_or(Focus::None);
    let secondary = nonzero.next().unwrap_or(Focus::None);
    (primary, secondary)
}

fn degenerate_score() -> HealthScore {
    HealthScore {
        score: 0,
        needs_ratio: 0.0,
        wants_ratio: 0.0,
        savings_ratio: 0.0,
        needs_deviation: 0.0,
        wants_deviation: 0.0,
        savings_deviation: 0.0,
        primary_focus: Focus::None,
        secondary_focus: Focus::None,
        status: StatusLabel::Poor,
    }
}
