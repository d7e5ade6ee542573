//! Ledger template command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use budgetcheck_core::write_template_csv;

pub fn cmd_template(output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_template_csv(file).context("Failed to write template")?;
            println!("✅ Template written to {}", path.display());
        }
        None => {
            write_template_csv(std::io::stdout().lock()).context("Failed to write template")?;
        }
    }
    Ok(())
}
