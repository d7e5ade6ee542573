//! Currency list command

use anyhow::{Context, Result};
use budgetcheck_core::{CurrencyStore, DEFAULT_CURRENCY};

pub fn cmd_currencies() -> Result<()> {
    let store = CurrencyStore::new().context("Failed to load currency list")?;

    println!();
    println!("💱 Currencies ({})", store.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for currency in store.all() {
        let marker = if currency.code == DEFAULT_CURRENCY {
            " (default)"
        } else {
            ""
        };
        println!(
            "   {:4} {:4} {}{}",
            currency.code, currency.symbol, currency.name, marker
        );
    }
    println!();
    Ok(())
}
