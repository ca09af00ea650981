//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` / `open_ledger` - Shared utilities to open the database and ledger
//! - `cmd_init` - Initialize the database
//! - `cmd_branches` - List configured branches

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use salesbook_core::{db::Database, AppConfig, PeriodQuery, SalesLedger};

use crate::cli::PeriodArgs;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load configuration from --config, the data dir override, or built-in defaults
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                tracing::warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
            }
            AppConfig::with_config_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => AppConfig::load().context("Failed to load config"),
    }
}

/// Open the database and wrap it in a ledger
pub fn open_ledger(
    db_path: &Path,
    config_path: Option<&Path>,
    no_encrypt: bool,
) -> Result<SalesLedger<Database>> {
    let config = load_config(config_path)?;
    let db = open_db(db_path, no_encrypt)?;
    Ok(SalesLedger::new(config, db))
}

/// Build a period query, defaulting to the current month
pub fn period_query(ledger: &SalesLedger<Database>, period: &PeriodArgs) -> Result<PeriodQuery> {
    let today = Utc::now().date_naive();
    let month = period.month.unwrap_or_else(|| today.month());
    let year = period.year.unwrap_or_else(|| today.year());
    ledger
        .query(month, year, &period.branch)
        .context("Invalid period")
}

/// Parse a YYYY-MM-DD argument
pub fn parse_date_arg(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", date))
}

pub fn cmd_init(db_path: &Path, config_path: Option<&Path>, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let ledger = open_ledger(db_path, config_path, no_encrypt)?;
    let count = ledger.store().count_sales_records()?;
    println!("   Records: {}", count);
    println!(
        "   Branches: {}",
        ledger
            .branches()
            .iter()
            .map(|b| b.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if ledger.store().is_encrypted() {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record a day: salesbook submit --branch SILOM --in-store 6000 --target-sales 10000");
    println!("  2. Import a month: salesbook import --file march.csv");
    println!("  3. Start web API: salesbook serve");

    Ok(())
}

pub fn cmd_branches(config: &AppConfig) -> Result<()> {
    println!("🏪 Branches ({})", config.app_id);
    println!("   ─────────────────────────────");
    for branch in &config.branches {
        println!("   {}", branch);
    }
    Ok(())
}
