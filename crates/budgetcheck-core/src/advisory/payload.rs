//! Advisory payload
//!
//! A read-only snapshot of one analysis, serialized as compact JSON and sent
//! to the advisory backend. Field order is fixed by the struct layout, so the
//! same analysis always serializes to the same bytes; the fallback selector
//! relies on that.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{BudgetBreakdown, BudgetType, HealthScore, StatusLabel};

/// Most wants categories included in the payload
pub const PAYLOAD_TOP_CATEGORIES: usize = 3;

const ROLE: &str = "Individual seeking financial optimization using 50/30/20 methodology";
const GOAL: &str = "Achieve optimal 50/30/20 budget allocation";
const CALCULATION_METHOD: &str =
    "Weighted deviation model (Needs: 20%, Wants: 50%, Savings: 60%)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryPayload {
    pub user_profile: UserProfile,
    /// Currency label, passed through untouched
    pub currency: String,
    pub financial_overview: FinancialOverview,
    pub budget_breakdown: BucketSet<BucketLine>,
    pub deviation_analysis: BucketSet<DeviationLine>,
    pub top_wants_categories: Vec<TopCategory>,
    pub health_metrics: HealthMetrics,
    pub priority_areas: PriorityAreas,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub role: String,
    pub goal: String,
    pub health_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialOverview {
    pub monthly_income: Decimal,
    pub total_tracked_spending: Decimal,
    /// Income not covered by any bucket, never negative
    pub untracked_amount: Decimal,
    pub coverage_percentage: f64,
}

/// One value per budget bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSet<T> {
    pub needs: T,
    pub wants: T,
    pub savings: T,
}

impl<T> BucketSet<T> {
    fn from_fn(mut f: impl FnMut(BudgetType) -> T) -> Self {
        Self {
            needs: f(BudgetType::Needs),
            wants: f(BudgetType::Wants),
            savings: f(BudgetType::Savings),
        }
    }

    pub fn get(&self, budget_type: BudgetType) -> &T {
        match budget_type {
            BudgetType::Needs => &self.needs,
            BudgetType::Wants => &self.wants,
            BudgetType::Savings => &self.savings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketLine {
    pub amount: Decimal,
    pub percentage_of_income: f64,
    pub target_percentage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviationStatus {
    Over,
    Under,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationLine {
    /// Signed percentage points away from target
    pub deviation_from_target: f64,
    pub status: DeviationStatus,
    /// Amount that would bring the bucket onto its target
    pub needed_adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCategory {
    pub category: String,
    pub amount: Decimal,
    pub percentage_of_wants: f64,
    pub percentage_of_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthMetrics {
    pub overall_score: u8,
    pub score_out_of: u8,
    pub status: StatusLabel,
    pub score_category: String,
    pub calculation_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityAreas {
    pub primary_focus: String,
    pub secondary_focus: String,
    /// Share of income the score leaves on the table
    pub improvement_potential: f64,
    /// Clamped deviations that drive the score and the focus ranking
    pub deviations: BucketSet<f64>,
}

impl AdvisoryPayload {
    /// Build the payload for one analysis
    pub fn build(
        income: Decimal,
        currency: &str,
        breakdown: &BudgetBreakdown,
        health: &HealthScore,
    ) -> Self {
        let income_f = to_f64(income);
        let tracked = breakdown.tracked_total();
        let untracked = (income - tracked).max(Decimal::ZERO);

        let ratio_of = |budget_type: BudgetType| match budget_type {
            BudgetType::Needs => health.needs_ratio,
            BudgetType::Wants => health.wants_ratio,
            BudgetType::Savings => health.savings_ratio,
        };

        let budget_breakdown = BucketSet::from_fn(|budget_type| BucketLine {
            amount: breakdown.total_for(budget_type),
            percentage_of_income: round1(ratio_of(budget_type) * 100.0),
            target_percentage: (budget_type.target_ratio() * 100.0).round() as u8,
        });

        let deviation_analysis = BucketSet::from_fn(|budget_type| {
            let deviation = ratio_of(budget_type) - budget_type.target_ratio();
            let status = match budget_type {
                BudgetType::Savings if deviation < 0.0 => DeviationStatus::Under,
                BudgetType::Savings => DeviationStatus::Over,
                _ if deviation > 0.0 => DeviationStatus::Over,
                _ => DeviationStatus::Under,
            };
            DeviationLine {
                deviation_from_target: round1(deviation * 100.0),
                status,
                needed_adjustment: round2(deviation.abs() * income_f),
            }
        });

        let wants_f = to_f64(breakdown.wants_total);
        let top_wants_categories = breakdown
            .top_discretionary
            .iter()
            .take(PAYLOAD_TOP_CATEGORIES)
            .map(|(category, amount)| {
                let amount_f = to_f64(*amount);
                TopCategory {
                    category: category.clone(),
                    amount: *amount,
                    percentage_of_wants: round1(percent(amount_f, wants_f)),
                    percentage_of_income: round1(percent(amount_f, income_f)),
                }
            })
            .collect();

        Self {
            user_profile: UserProfile {
                role: ROLE.to_string(),
                goal: GOAL.to_string(),
                health_status: health.status.description().to_string(),
            },
            currency: currency.to_string(),
            financial_overview: FinancialOverview {
                monthly_income: income,
                total_tracked_spending: tracked,
                untracked_amount: untracked,
                coverage_percentage: round1(percent(to_f64(tracked), income_f)),
            },
            budget_breakdown,
            deviation_analysis,
            top_wants_categories,
            health_metrics: HealthMetrics {
                overall_score: health.score,
                score_out_of: 100,
                status: health.status,
                score_category: health.status.description().to_string(),
                calculation_method: CALCULATION_METHOD.to_string(),
            },
            priority_areas: PriorityAreas {
                primary_focus: health.primary_focus.as_str().to_string(),
                secondary_focus: health.secondary_focus.as_str().to_string(),
                improvement_potential: round2(
                    f64::from(100 - health.score.min(100)) / 100.0 * income_f,
                ),
                deviations: BucketSet {
                    needs: round4(health.needs_deviation),
                    wants: round4(health.wants_deviation),
                    savings: round4(health.savings_deviation),
                },
            },
        }
    }

    /// Compact JSON, identical for identical analyses
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// SHA-256 of the canonical JSON
    pub fn fingerprint(&self) -> Result<[u8; 32]> {
        let json = self.canonical_json()?;
        Ok(Sha256::digest(json.as_bytes()).into())
    }

    pub fn status(&self) -> StatusLabel {
        self.health_metrics.status
    }
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// `part / whole * 100`, or 0 when `whole` is not positive
fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
