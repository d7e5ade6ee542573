//! End-to-end analysis of one ledger
//!
//! raw rows -> validated rows -> breakdown -> health score -> payload -> advice
//!
//! Each run owns everything it creates. The currency store is the only shared
//! value and is read-only.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::advisory::{AdvisoryOrchestrator, AdvisoryPayload, AdvisoryRun};
use crate::aggregate::{aggregate, TOP_DISCRETIONARY_LIMIT};
use crate::currency::CurrencyStore;
use crate::error::{Error, Result};
use crate::models::{AdvisoryResult, BudgetBreakdown, Dataset, HealthScore, RowError};
use crate::score::score_breakdown;
use crate::validate::{validate_dataset, Validated, MAX_INCOME};

/// Everything produced by a successful analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Currency label the amounts are shown in
    pub currency: String,
    pub income: Decimal,
    pub transaction_count: usize,
    pub breakdown: BudgetBreakdown,
    pub health: HealthScore,
    pub advisory: AdvisoryResult,
}

/// Result of analyzing a ledger
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// The ledger had row errors; nothing was scored
    Rejected(Vec<RowError>),
    Completed(AnalysisReport),
}

/// Runs analyses against a shared currency store and advisory orchestrator
pub struct Analyzer {
    currencies: Arc<CurrencyStore>,
    orchestrator: AdvisoryOrchestrator,
    top_categories: usize,
}

impl Analyzer {
    pub fn new(currencies: Arc<CurrencyStore>, orchestrator: AdvisoryOrchestrator) -> Self {
        Self {
            currencies,
            orchestrator,
            top_categories: TOP_DISCRETIONARY_LIMIT,
        }
    }

    /// Length of the top discretionary list (clamped to 3..=5 when aggregating)
    pub fn with_top_categories(mut self, top_categories: usize) -> Self {
        self.top_categories = top_categories;
        self
    }

    pub fn currencies(&self) -> &CurrencyStore {
        &self.currencies
    }

    /// Analyze a ledger
    ///
    /// Errors are dataset-level only (capacity, schema, bad income). Row
    /// problems come back as [`AnalysisOutcome::Rejected`]; advisory problems
    /// come back as fallback advice.
    pub async fn analyze(
        &self,
        dataset: &Dataset,
        income: Decimal,
        currency_code: &str,
    ) -> Result<AnalysisOutcome> {
        Ok(match self.analyze_with_trace(dataset, income, currency_code).await? {
            Analysis::Rejected(errors) => AnalysisOutcome::Rejected(errors),
            Analysis::Completed(report, _) => AnalysisOutcome::Completed(report),
        })
    }

    /// Same as [`Analyzer::analyze`] but keeps the advisory state trace
    pub async fn analyze_with_trace(
        &self,
        dataset: &Dataset,
        income: Decimal,
        currency_code: &str,
    ) -> Result<Analysis> {
        if income <= Decimal::ZERO || income > MAX_INCOME {
            return Err(Error::InvalidData(format!(
                "income must be greater than 0 and at most {}",
                MAX_INCOME
            )));
        }

        let transactions = match validate_dataset(dataset)? {
            Validated::Accepted(transactions) => transactions,
            Validated::Rejected(errors) => return Ok(Analysis::Rejected(errors)),
        };

        let breakdown = aggregate(&transactions, self.top_categories);
        let health = score_breakdown(income, &breakdown);
        info!(
            transactions = transactions.len(),
            score = health.score,
            status = %health.status,
            "Ledger scored"
        );

        let currency = self.currencies.label_for(currency_code).to_string();
        let payload = AdvisoryPayload::build(income, &currency, &breakdown, &health);
        let run = self.orchestrator.advise(&payload, &health).await;

        let report = AnalysisReport {
            currency,
            income,
            transaction_count: transactions.len(),
            breakdown,
            health,
            advisory: run.result.clone(),
        };
        Ok(Analysis::Completed(report, run))
    }
}

/// [`AnalysisOutcome`] plus the advisory run, for diagnostics
#[derive(Debug, Clone)]
pub enum Analysis {
    Rejected(Vec<RowError>),
    Completed(AnalysisReport, AdvisoryRun),
}
