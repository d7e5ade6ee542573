//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Budgetcheck - Score a spending ledger against the 50/30/20 rule
#[derive(Parser)]
#[command(name = "budgetcheck")]
#[command(about = "50/30/20 budget health checker with advisory feedback", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Advisory config file (defaults to the data-dir override, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a ledger, score it and print advice
    Analyze {
        /// Ledger file (.xlsx, .xls, .ods or .csv)
        file: PathBuf,

        /// Monthly income, e.g. 2000 or 2,000.50
        #[arg(short, long)]
        income: String,

        /// Currency code used to label amounts
        #[arg(short, long, default_value = "GBP")]
        currency: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Advisory request timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Skip the advisory backend and use fallback advice
        #[arg(long)]
        offline: bool,
    },

    /// Score four numbers without a ledger
    Score {
        /// Monthly income
        income: f64,

        /// Total spent on needs
        needs: f64,

        /// Total spent on wants
        wants: f64,

        /// Total put into savings
        savings: f64,
    },

    /// List supported currencies
    Currencies,

    /// Write a ledger template CSV with example rows
    Template {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
