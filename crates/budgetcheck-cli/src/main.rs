//! Budgetcheck CLI - 50/30/20 ledger analyzer
//!
//! Usage:
//!   budgetcheck analyze ledger.xlsx --income 2000   Score a ledger and get advice
//!   budgetcheck score 2000 1000 600 400              Score four numbers
//!   budgetcheck currencies                           List currency codes
//!   budgetcheck template -o ledger.csv               Write a ledger template

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            income,
            currency,
            json,
            timeout,
            offline,
        } => {
            let options = commands::AnalyzeOptions {
                config_path: cli.config,
                currency,
                json,
                timeout_secs: timeout,
                offline,
            };
            commands::cmd_analyze(&file, &income, &options).await
        }
        Commands::Score {
            income,
            needs,
            wants,
            savings,
        } => commands::cmd_score(income, needs, wants, savings),
        Commands::Currencies => commands::cmd_currencies(),
        Commands::Template { output } => commands::cmd_template(output.as_deref()),
    }
}
