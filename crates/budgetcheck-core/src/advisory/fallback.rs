//! Deterministic fallback advice
//!
//! Used whenever generated advice is unavailable. Each status label has a
//! small set of templates; the template is picked from the payload
//! fingerprint, so identical analyses always get identical text.
//!
//! Placeholders: `{needs}`, `{wants}`, `{savings}` (percent of income, one
//! decimal) and `{top_wants}` (largest wants categories with their share of
//! income).

use tracing::debug;

use crate::models::{BudgetType, StatusLabel};

use super::payload::AdvisoryPayload;

const POOR: &[&str] = &[
    "Based on your 50/30/20 analysis, tighten wants spending and lift savings to reach your 20% target. \
     Needs: {needs}% (50% target), Wants: {wants}% (30% target), Savings: {savings}% (20% target).",
    "Your score shows room to rebalance: trim non-essentials and redirect them to savings until you hit 20%. \
     Current split: Needs {needs}%, Wants {wants}%, Savings {savings}%.",
    "Close the gap by targeting your top wants categories: {top_wants}. \
     Reallocate at least half of those amounts to savings.",
];

const FAIR: &[&str] = &[
    "Focus on two actions: reduce wants by 5-10% and move that to savings, and keep needs near 50%. \
     Snapshot: Needs {needs}%, Wants {wants}%, Savings {savings}%.",
    "Bring wants closer to 30% and push savings toward 20%. \
     Start with your top wants categories: {top_wants}.",
    "If income is volatile, pre-commit a fixed savings percentage on payday and cap wants at 30%. \
     Present mix: Needs {needs}%, Wants {wants}%, Savings {savings}%.",
];

const GOOD: &[&str] = &[
    "Solid start. Nudge savings up by trimming the largest wants categories and automate a monthly transfer to savings. \
     Needs {needs}%, Wants {wants}%, Savings {savings}%.",
    "Good balance. To reach Excellent, aim for Wants at or below 30% and Savings at or above 20% while keeping Needs near 50%. \
     Current: Needs {needs}%, Wants {wants}%, Savings {savings}%.",
    "Efficiency tweak: freeze one or two discretionary categories for 30 days and divert that amount to savings. \
     Top wants: {top_wants}.",
];

const EXCELLENT: &[&str] = &[
    "Great trajectory. Lock in a minimum 20% savings auto-transfer and keep wants under 30% to maintain an Excellent score. \
     Needs {needs}%, Wants {wants}%, Savings {savings}%.",
    "Your budget is well balanced. Review your top wants categories ({top_wants}) once a quarter so they stay under 30%.",
    "Excellent split: Needs {needs}%, Wants {wants}%, Savings {savings}%. \
     Consider building a six-month emergency fund or raising savings further.",
];

const NO_DOMINANT_WANTS: &str = "No dominant wants categories";

/// Templates for a status label
pub fn templates_for(status: StatusLabel) -> &'static [&'static str] {
    match status {
        StatusLabel::Poor => POOR,
        StatusLabel::Fair => FAIR,
        StatusLabel::Good => GOOD,
        StatusLabel::Excellent => EXCELLENT,
    }
}

/// Index of the template to use, from the first eight fingerprint bytes
pub fn select_template(fingerprint: &[u8; 32], count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let mut head = [0u8; 8];
    head.copy_from_slice(&fingerprint[..8]);
    (u64::from_be_bytes(head) % count as u64) as usize
}

/// Fallback advice for a payload
///
/// A payload that cannot be fingerprinted uses the first template.
pub fn fallback_advice(payload: &AdvisoryPayload) -> String {
    let templates = templates_for(payload.status());
    let idx = match payload.fingerprint() {
        Ok(fp) => {
            let idx = select_template(&fp, templates.len());
            debug!(
                fingerprint = %hex::encode(&fp[..8]),
                status = %payload.status(),
                template = idx,
                "Fallback template selected"
            );
            idx
        }
        Err(_) => 0,
    };
    render(templates[idx], payload)
}

fn render(template: &str, payload: &AdvisoryPayload) -> String {
    let pct = |budget_type| {
        format!(
            "{:.1}",
            payload.budget_breakdown.get(budget_type).percentage_of_income
        )
    };

    template
        .replace("{needs}", &pct(BudgetType::Needs))
        .replace("{wants}", &pct(BudgetType::Wants))
        .replace("{savings}", &pct(BudgetType::Savings))
        .replace("{top_wants}", &top_wants_text(payload))
}

fn top_wants_text(payload: &AdvisoryPayload) -> String {
    if payload.top_wants_categories.is_empty() {
        return NO_DOMINANT_WANTS.to_string();
    }
    payload
        .top_wants_categories
        .iter()
        .map(|c| format!("{}: {:.1}%", c.category, c.percentage_of_income))
        .collect::<Vec<_>>()
        .join(", ")
}
