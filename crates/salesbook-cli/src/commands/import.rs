//! Import/export command implementations

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use salesbook_core::db::Database;
use salesbook_core::export::{export_records_csv, import_sales_csv};
use salesbook_core::{ImportStats, SalesLedger};

use super::period_query;
use crate::cli::PeriodArgs;

pub fn cmd_import(ledger: &SalesLedger<Database>, file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let stats = import_file(ledger, file)?;

    println!();
    println!("📊 Import Results");
    println!("   ─────────────────────────────");
    println!("   Imported: {}", stats.imported);
    println!("   Skipped:  {}", stats.skipped.len());
    for skipped in &stats.skipped {
        println!("     line {}: {}", skipped.line, skipped.reason);
    }

    Ok(())
}

/// Import a CSV file through the ledger
pub fn import_file(ledger: &SalesLedger<Database>, file: &Path) -> Result<ImportStats> {
    let handle =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    import_sales_csv(ledger, BufReader::new(handle)).context("Import failed")
}

pub fn cmd_export(
    ledger: &SalesLedger<Database>,
    period: &PeriodArgs,
    output: Option<&Path>,
) -> Result<()> {
    let query = period_query(ledger, period)?;
    let records = ledger.records(&query)?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let count = export_records_csv(&records, file)?;
            tracing::info!(count, period = %query.label(), "Exported sales records");
            println!(
                "✅ Exported {} record(s) for {} to {}",
                count,
                query.label(),
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            export_records_csv(&records, &mut handle)?;
            handle.flush()?;
        }
    }

    Ok(())
}
