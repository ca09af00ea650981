//! Salesbook CLI - Daily branch sales tracker
//!
//! Usage:
//!   salesbook init                              Initialize database
//!   salesbook submit --branch SILOM --in-store 6000 ...
//!   salesbook import --file march.csv           Import daily inputs
//!   salesbook report trend --month 3 --year 2024 --branch SILOM
//!   salesbook serve --port 3000                 Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

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
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, config_path, cli.no_encrypt),
        Commands::Branches => {
            let config = commands::load_config(config_path)?;
            commands::cmd_branches(&config)
        }
        Commands::Submit(args) => {
            let ledger = commands::open_ledger(&cli.db, config_path, cli.no_encrypt)?;
            commands::cmd_submit(&ledger, &args)
        }
        Commands::Records { action } => {
            let ledger = commands::open_ledger(&cli.db, config_path, cli.no_encrypt)?;
            match action {
                RecordsAction::List { period, json } => {
                    commands::cmd_records_list(&ledger, &period, json)
                }
                RecordsAction::Show { branch, date, json } => {
                    commands::cmd_records_show(&ledger, &branch, &date, json)
                }
                RecordsAction::Delete { branch, date } => {
                    commands::cmd_records_delete(&ledger, &branch, &date)
                }
            }
        }
        Commands::Report { action } => {
            let ledger = commands::open_ledger(&cli.db, config_path, cli.no_encrypt)?;
            match action {
                ReportAction::Summary { period, json } => {
                    commands::cmd_report_summary(&ledger, &period, json)
                }
                ReportAction::Trend { period, json } => {
                    commands::cmd_report_trend(&ledger, &period, json)
                }
            }
        }
        Commands::Export { period, output } => {
            let ledger = commands::open_ledger(&cli.db, config_path, cli.no_encrypt)?;
            commands::cmd_export(&ledger, &period, output.as_deref())
        }
        Commands::Import { file } => {
            let ledger = commands::open_ledger(&cli.db, config_path, cli.no_encrypt)?;
            commands::cmd_import(&ledger, &file)
        }
        Commands::Serve { port, host } => {
            commands::cmd_serve(&cli.db, config_path, &host, port, cli.no_encrypt).await
        }
    }
}
