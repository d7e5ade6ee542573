//! Budgetcheck Core Library
//!
//! Shared functionality for the budgetcheck 50/30/20 ledger analyzer:
//! - Spreadsheet and CSV ledger reading
//! - Row validation with per-row error messages
//! - Needs/Wants/Savings aggregation and health scoring
//! - Pluggable advisory backends (Gemini, OpenAI-compatible) with
//!   deterministic fallback advice
//! - Prompt library for customizable advisory prompts
//! - Currency list and advisory configuration

pub mod advisory;
pub mod aggregate;
pub mod analysis;
pub mod coerce;
pub mod config;
pub mod currency;
pub mod error;
pub mod models;
pub mod prompts;
pub mod score;
pub mod validate;
pub mod workbook;

/// Test utilities including a mock advisory server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisory::{
    fallback_advice, AdvisoryBackend, AdvisoryClient, AdvisoryOrchestrator, AdvisoryPayload,
    AdvisoryRun, AdvisoryState, FailureReason, GeminiBackend, MockBackend, MockMode,
    OpenAICompatibleBackend,
};
pub use aggregate::aggregate;
pub use analysis::{Analysis, AnalysisOutcome, AnalysisReport, Analyzer};
pub use config::{AdvisorConfig, BackendKind, GenerationConfig};
pub use currency::{Currency, CurrencyStore, DEFAULT_CURRENCY};
pub use error::{Error, Result};
pub use models::{
    AdvisoryResult, AdvisorySource, BudgetBreakdown, BudgetType, CellValue, Dataset, Focus,
    HealthScore, RawRow, RowError, StatusLabel, Transaction,
};
pub use prompts::{Prompt, PromptId, PromptLibrary, RenderedPrompt};
pub use score::{compute_health_score, score_breakdown};
pub use validate::{parse_income, validate_dataset, Validated};
pub use workbook::{read_csv, read_ledger, write_template_csv, LedgerFormat};
