//! Integration tests for budgetcheck-core
//!
//! These tests exercise the full read -> validate -> score -> advise workflow.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use budgetcheck_core::{
    read_csv, read_ledger, validate_dataset, write_template_csv, AdvisoryClient,
    AdvisoryOrchestrator, AdvisorySource, AdvisoryState, AnalysisOutcome, Analysis, Analyzer,
    BudgetType, CurrencyStore, Error, FailureReason, GeminiBackend, MockMode, PromptId,
    PromptLibrary, StatusLabel, Validated,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Ledger roughly on the 50/30/20 split for an income of 2000
fn balanced_csv() -> &'static str {
    r#"Date,Name,Type,Amount,Category
01/03/2026,Rent,Needs,850.00,Housing
02/03/2026,Groceries,Needs,150.00,Food
05/03/2026,Dinner out,Wants,120.50,Eating Out
07/03/2026,Cinema,Wants,30.00,Entertainment
09/03/2026,Takeaway,wants,80.00,eating out
12/03/2026,Concert,Wants,369.50,Entertainment
15/03/2026,ISA,Savings,400.00,Investments
,,,,
"#
}

fn analyzer(client: Option<AdvisoryClient>, timeout: Duration) -> Analyzer {
    let prompt = PromptLibrary::embedded_only()
        .get(PromptId::BudgetAdvice)
        .expect("embedded prompt")
        .clone();
    let orchestrator = AdvisoryOrchestrator::with_prompt(client, prompt, timeout);
    let currencies = CurrencyStore::new().expect("embedded currencies");
    Analyzer::new(Arc::new(currencies), orchestrator)
}

fn completed(outcome: AnalysisOutcome) -> budgetcheck_core::AnalysisReport {
    match outcome {
        AnalysisOutcome::Completed(report) => report,
        AnalysisOutcome::Rejected(errors) => panic!("unexpected row errors: {:?}", errors),
    }
}

// =============================================================================
// Full workflow
// =============================================================================

#[tokio::test]
async fn test_balanced_csv_without_backend_uses_fallback() {
    let dataset = read_csv(balanced_csv().as_bytes()).unwrap();
    let report = completed(
        analyzer(None, Duration::from_secs(15))
            .analyze(&dataset, Decimal::from(2000), "GBP")
            .await
            .unwrap(),
    );

    assert_eq!(report.transaction_count, 7);
    assert_eq!(report.breakdown.needs_total, Decimal::from(1000));
    assert_eq!(report.breakdown.wants_total, Decimal::from(600));
    assert_eq!(report.breakdown.savings_total, Decimal::from(400));
    assert_eq!(report.health.score, 100);
    assert_eq!(report.health.status, StatusLabel::Excellent);
    assert_eq!(report.currency, "£");

    // Categories merge case-insensitively
    assert_eq!(report.breakdown.top_discretionary[0].1, Decimal::new(3995, 1));
    assert_eq!(report.breakdown.top_discretionary[1].1, Decimal::new(2005, 1));

    assert_eq!(report.advisory.source, AdvisorySource::Fallback);
    assert_eq!(report.advisory.score, 100);
    assert!(!report.advisory.advice.is_empty());
}

#[tokio::test]
async fn test_fallback_advice_is_deterministic() {
    let dataset = read_csv(balanced_csv().as_bytes()).unwrap();
    let a = analyzer(None, Duration::from_secs(15));

    let first = completed(a.analyze(&dataset, Decimal::from(2000), "GBP").await.unwrap());
    let second = completed(a.analyze(&dataset, Decimal::from(2000), "GBP").await.unwrap());
    assert_eq!(first.advisory.advice, second.advisory.advice);
}

#[tokio::test]
async fn test_generated_advice_from_backend() {
    let dataset = read_csv(balanced_csv().as_bytes()).unwrap();
    let client = AdvisoryClient::mock(MockMode::Reply("Keep it up.".into()));
    let report = completed(
        analyzer(Some(client), Duration::from_secs(15))
            .analyze(&dataset, Decimal::from(2000), "USD")
            .await
            .unwrap(),
    );

    assert_eq!(report.advisory.source, AdvisorySource::Generated);
    assert_eq!(report.advisory.advice, "Keep it up.");
    assert_eq!(report.currency, "$");
}

#[tokio::test]
async fn test_slow_backend_times_out_to_fallback() {
    let dataset = read_csv(balanced_csv().as_bytes()).unwrap();
    let client = AdvisoryClient::mock(MockMode::Delay(Duration::from_secs(30)));
    let analysis = analyzer(Some(client), Duration::from_millis(50))
        .analyze_with_trace(&dataset, Decimal::from(2000), "GBP")
        .await
        .unwrap();

    let Analysis::Completed(report, run) = analysis else {
        panic!("expected completed analysis");
    };
    assert!(run.timed_out());
    assert_eq!(report.advisory.source, AdvisorySource::Fallback);
    assert_eq!(report.advisory.score, report.health.score);
}

#[tokio::test]
async fn test_unreachable_backend_falls_back() {
    let dataset = read_csv(balanced_csv().as_bytes()).unwrap();
    let client = AdvisoryClient::Gemini(GeminiBackend::new(
        "http://127.0.0.1:9",
        "gemini-2.5-flash",
        "test-key",
    ));
    let analysis = analyzer(Some(client), Duration::from_secs(5))
        .analyze_with_trace(&dataset, Decimal::from(2000), "GBP")
        .await
        .unwrap();

    let Analysis::Completed(report, run) = analysis else {
        panic!("expected completed analysis");
    };
    assert_eq!(report.advisory.source, AdvisorySource::Fallback);
    assert!(matches!(run.failure(), Some(FailureReason::Backend(_))));
    assert_eq!(
        run.trace.last(),
        Some(&AdvisoryState::Resolved(AdvisorySource::Fallback))
    );
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_row_errors_are_reported_in_order() {
    let csv = "Date,Name,Type,Amount,Category\n\
               01/03/2026,Rent,Needs,850,Housing\n\
               2026-13-45,Bad date,Needs,10,Food\n\
               03/03/2026,Gym,Luxury,10,Fitness\n\
               04/03/2026,Coffee,Wants,-3,Food\n";
    let dataset = read_csv(csv.as_bytes()).unwrap();
    let outcome = analyzer(None, Duration::from_secs(15))
        .analyze(&dataset, Decimal::from(2000), "GBP")
        .await
        .unwrap();

    let AnalysisOutcome::Rejected(errors) = outcome else {
        panic!("expected row errors");
    };
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "Row 2: Invalid date format.",
            "Row 3: Invalid type.",
            "Row 4: Invalid amount.",
        ]
    );
}

#[tokio::test]
async fn test_missing_columns_are_named() {
    let dataset = read_csv("Date,Name,Amount\n01/03/2026,Rent,10\n".as_bytes()).unwrap();
    let err = analyzer(None, Duration::from_secs(15))
        .analyze(&dataset, Decimal::from(2000), "GBP")
        .await
        .unwrap_err();

    match err {
        Error::Schema { missing } => assert_eq!(missing, vec!["Type", "Category"]),
        other => panic!("expected schema error, got {:?}", other),
    }
}

// =============================================================================
// Files
// =============================================================================

#[tokio::test]
async fn test_template_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.csv");
    let file = std::fs::File::create(&path).unwrap();
    write_template_csv(file).unwrap();

    let dataset = read_ledger(&path).unwrap();
    assert!(dataset.byte_size > 0);

    let report = completed(
        analyzer(None, Duration::from_secs(15))
            .analyze(&dataset, Decimal::from(2000), "EUR")
            .await
            .unwrap(),
    );
    assert_eq!(report.transaction_count, 10);
    assert_eq!(report.breakdown.tracked_total(), Decimal::new(112570, 2));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(file, "Date,Name,Type,Amount,Category").unwrap();
    assert!(matches!(
        read_ledger(file.path()),
        Err(Error::UnsupportedFormat(_))
    ));
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_xlsx_ledger_cell_types() {
    // Row 2 is a date-formatted cell, row 4 a bare serial number, row 5 text;
    // row 3 is left empty.
    let dataset = read_ledger(&fixture("ledger.xlsx")).unwrap();
    assert_eq!(dataset.headers, vec!["Date", "Name", "Type", "Amount", "Category"]);

    let Validated::Accepted(transactions) = validate_dataset(&dataset).unwrap() else {
        panic!("expected accepted ledger");
    };
    assert_eq!(transactions.len(), 3);

    let dates: Vec<NaiveDate> = transactions.iter().map(|t| t.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(),
        ]
    );

    assert_eq!(transactions[0].amount, Decimal::new(5205, 1));
    assert_eq!(transactions[1].amount, Decimal::new(4999, 2));
    assert_eq!(transactions[2].amount, Decimal::from(430));
    assert_eq!(transactions[1].budget_type, BudgetType::Wants);
    assert_eq!(transactions[2].category, "Stocks");
}

#[test]
fn test_xlsx_row_numbers_skip_blank_rows() {
    let dataset = read_ledger(&fixture("ledger_rejected.xlsx")).unwrap();

    let Validated::Rejected(errors) = validate_dataset(&dataset).unwrap() else {
        panic!("expected row errors");
    };
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["Row 2: Invalid type.", "Row 3: Invalid amount."]);
}
