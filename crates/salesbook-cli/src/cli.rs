//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Salesbook - Daily branch sales and monthly trends
#[derive(Parser)]
#[command(name = "salesbook")]
#[command(about = "Record daily branch sales and analyze monthly performance", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "salesbook.db", global = true)]
    pub db: PathBuf,

    /// Config file (branches and trend thresholds)
    ///
    /// Defaults to ~/.local/share/salesbook/config/salesbook.toml when present,
    /// otherwise the built-in configuration.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SALESBOOK_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// List configured branches
    Branches,

    /// Record a day's sales for a branch (replaces any existing record)
    Submit(SubmitArgs),

    /// Inspect stored records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// Monthly reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Export a month's records to CSV
    Export {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import daily inputs from CSV (columns: branch,date,target_sales,...)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

/// Month, year and branch selection
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Month (1-12, defaults to the current month)
    #[arg(short, long)]
    pub month: Option<u32>,

    /// Year (defaults to the current year)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Branch code, or "all"
    #[arg(short, long, default_value = "all")]
    pub branch: String,
}

/// Raw inputs for one branch and day
///
/// Values are taken as typed; anything non-numeric is recorded as 0.
#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Branch code
    #[arg(short, long)]
    pub branch: String,

    /// Date (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Target sales for the day
    #[arg(long)]
    pub target_sales: Option<String>,

    /// In-store sales
    #[arg(long)]
    pub in_store: Option<String>,

    /// Takeaway sales
    #[arg(long)]
    pub takeaway: Option<String>,

    /// Grab sales
    #[arg(long)]
    pub grab: Option<String>,

    /// LINE MAN sales
    #[arg(long)]
    pub line_man: Option<String>,

    /// Number of bills
    #[arg(long)]
    pub bills: Option<String>,

    /// Number of customers
    #[arg(long)]
    pub customers: Option<String>,

    /// Target sales per bill
    #[arg(long)]
    pub target_per_bill: Option<String>,

    /// Target sales per customer
    #[arg(long)]
    pub target_per_head: Option<String>,

    /// Print the stored record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum RecordsAction {
    /// List a month's records in date order
    List {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one record with its derived figures
    Show {
        /// Branch code
        branch: String,

        /// Date (YYYY-MM-DD)
        date: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one record
    Delete {
        /// Branch code
        branch: String,

        /// Date (YYYY-MM-DD)
        date: String,
    },
}

#[derive(Subcommand)]
pub enum ReportAction {
    /// Monthly totals, channel mix and per-branch totals
    Summary {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Trend classification and narrative
    Trend {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
