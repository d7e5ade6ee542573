//! Currency list and symbol lookup
//!
//! The store is built once and passed to whatever needs it; it is never
//! mutated after construction. Codes are matched exactly (`"GBP"`, not
//! `"gbp"`), and no conversion between currencies is ever attempted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default currency list (compiled into binary)
const DEFAULT_CURRENCIES: &str = include_str!("../../../data/currencies.json");

/// Default currency offered when the user picks nothing
pub const DEFAULT_CURRENCY: &str = "GBP";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

/// Read-only list of known currencies
#[derive(Debug, Clone, Default)]
pub struct CurrencyStore {
    currencies: Vec<Currency>,
}

impl CurrencyStore {
    /// Load the embedded currency list
    pub fn new() -> Result<Self> {
        parse_currencies(DEFAULT_CURRENCIES)
    }

    /// Load a currency list from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        parse_currencies(&content)
    }

    /// Build a store from explicit entries (for testing)
    pub fn from_entries(currencies: Vec<Currency>) -> Self {
        Self { currencies }
    }

    /// Symbol for an exact currency code; None for unknown or empty codes
    pub fn symbol_for(&self, code: &str) -> Option<&str> {
        if code.is_empty() {
            return None;
        }
        self.get(code).map(|c| c.symbol.as_str())
    }

    pub fn get(&self, code: &str) -> Option<&Currency> {
        self.currencies.iter().find(|c| c.code == code)
    }

    /// Display label for amounts: the symbol when known, else the code itself
    pub fn label_for<'a>(&'a self, code: &'a str) -> &'a str {
        self.symbol_for(code).unwrap_or(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.currencies.iter().map(|c| c.code.as_str())
    }

    pub fn all(&self) -> &[Currency] {
        &self.currencies
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

fn parse_currencies(content: &str) -> Result<CurrencyStore> {
    let currencies: Vec<Currency> = serde_json::from_str(content)?;
    if let Some(bad) = currencies.iter().find(|c| c.code.trim().is_empty()) {
        return Err(Error::Config(format!(
            "currency entry with empty code (symbol {:?})",
            bad.symbol
        )));
    }
    Ok(CurrencyStore { currencies })
}
