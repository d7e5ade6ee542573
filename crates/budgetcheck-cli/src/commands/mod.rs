//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Ledger analysis (validate, score, advise) and report output
//! - `score` - Ad-hoc scoring from four numbers
//! - `currencies` - Currency list
//! - `template` - Ledger template CSV

pub mod analyze;
pub mod currencies;
pub mod score;
pub mod template;

// Re-export command functions for main.rs
pub use analyze::*;
pub use currencies::*;
pub use score::*;
pub use template::*;

/// Render a ratio as a percentage with one decimal, e.g. `0.5` -> `50.0%`
pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
