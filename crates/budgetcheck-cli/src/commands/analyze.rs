//! Ledger analysis command

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use budgetcheck_core::{
    parse_income, read_ledger, AdvisorConfig, AdvisoryBackend, AdvisoryClient,
    AdvisoryOrchestrator, AnalysisOutcome, AnalysisReport, Analyzer, BudgetType, CurrencyStore,
    RowError,
};
use tracing::{info, warn};

use super::{percent, truncate};

/// Options for `budgetcheck analyze`
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub config_path: Option<PathBuf>,
    pub currency: String,
    pub json: bool,
    pub timeout_secs: Option<u64>,
    /// Never contact an advisory backend
    pub offline: bool,
}

/// Load the advisory config, applying command-line overrides
pub fn load_config(options: &AnalyzeOptions) -> Result<AdvisorConfig> {
    let config = match options.config_path {
        Some(ref path) => AdvisorConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AdvisorConfig::load().context("Failed to load advisory config")?,
    };

    match options.timeout_secs {
        Some(0) => bail!("--timeout must be at least 1 second"),
        Some(secs) => Ok(config.with_timeout_secs(secs)),
        None => Ok(config),
    }
}

pub async fn cmd_analyze(file: &Path, income: &str, options: &AnalyzeOptions) -> Result<()> {
    let income_value = match parse_income(income) {
        Some(value) => value,
        None => bail!(
            "Invalid income '{}': enter a number greater than 0 and at most 1,000,000,000",
            income
        ),
    };

    let config = load_config(options)?;
    let dataset =
        read_ledger(file).with_context(|| format!("Failed to read ledger {}", file.display()))?;

    let currencies = CurrencyStore::new().context("Failed to load currency list")?;
    if currencies.get(&options.currency).is_none() {
        warn!(currency = %options.currency, "Unknown currency code, showing it as-is");
    }

    let client = if options.offline {
        None
    } else {
        AdvisoryClient::from_env(&config)
    };
    match client {
        Some(ref c) => info!(backend = %c.kind(), model = c.model(), "Advisory backend ready"),
        None => info!("No advisory backend, advice will use built-in templates"),
    }

    let orchestrator = AdvisoryOrchestrator::new(client, &config)?;
    let analyzer = Analyzer::new(Arc::new(currencies), orchestrator)
        .with_top_categories(config.top_categories);

    match analyzer
        .analyze(&dataset, income_value, &options.currency)
        .await?
    {
        AnalysisOutcome::Rejected(errors) => {
            if options.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "errors": errors }))?
                );
            } else {
                print_row_errors(&errors);
            }
            bail!("{} row(s) failed validation", errors.len());
        }
        AnalysisOutcome::Completed(report) => {
            if options.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn print_row_errors(errors: &[RowError]) {
    println!();
    println!("❌ Ledger rejected");
    println!("   ─────────────────────────────────────────────────────────────");
    for error in errors {
        println!("   {}", error);
    }
    println!();
    println!("   Fix the rows above and run the analysis again.");
    println!();
}

fn print_report(report: &AnalysisReport) {
    let health = &report.health;
    let symbol = &report.currency;

    println!();
    println!("📊 50/30/20 Budget Check");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Income: {}{:.2}", symbol, report.income);
    println!("   Transactions: {}", report.transaction_count);
    println!();
    println!(
        "   {:10} │ {:>12} │ {:>8} │ {:>6}",
        "Bucket", "Amount", "Actual", "Target"
    );
    println!("   ───────────┼──────────────┼──────────┼───────");

    let ratios = [health.needs_ratio, health.wants_ratio, health.savings_ratio];
    for (budget_type, ratio) in BudgetType::all().iter().zip(ratios) {
        println!(
            "   {:10} │ {:>12} │ {:>8} │ {:>6}",
            budget_type.as_str(),
            format!("{}{:.2}", symbol, report.breakdown.total_for(*budget_type)),
            percent(ratio),
            percent(budget_type.target_ratio()),
        );
    }

    if !report.breakdown.top_discretionary.is_empty() {
        println!();
        println!("   Top wants:");
        for (category, amount) in &report.breakdown.top_discretionary {
            println!("     {:24} {}{:.2}", truncate(category, 24), symbol, amount);
        }
    }

    println!();
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
    println!("💡 Advice ({})", report.advisory.source);
    println!("   ─────────────────────────────────────────────────────────────");
    for line in report.advisory.advice.lines() {
        println!("   {}", line);
    }
    println!();
}
