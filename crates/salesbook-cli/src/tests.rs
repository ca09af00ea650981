//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::NaiveDate;
use clap::Parser;
use salesbook_core::db::Database;
use salesbook_core::{AppConfig, BranchCode, SalesLedger};

use crate::cli::{Cli, Commands, PeriodArgs, ReportAction, SubmitArgs};
use crate::commands::{self, format_amount, format_percent};

fn setup_test_ledger() -> SalesLedger<Database> {
    let db = Database::in_memory().unwrap();
    SalesLedger::new(AppConfig::default(), db)
}

fn submit_args(branch: &str, date: &str, in_store: &str, target: &str) -> SubmitArgs {
    SubmitArgs {
        branch: branch.to_string(),
        date: Some(date.to_string()),
        target_sales: Some(target.to_string()),
        in_store: Some(in_store.to_string()),
        takeaway: None,
        grab: None,
        line_man: None,
        bills: Some("10".to_string()),
        customers: Some("20".to_string()),
        target_per_bill: None,
        target_per_head: None,
        json: false,
    }
}

fn march(branch: &str) -> PeriodArgs {
    PeriodArgs {
        month: Some(3),
        year: Some(2024),
        branch: branch.to_string(),
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

// ========== Helper Function Tests ==========

#[test]
fn test_format_amount() {
    assert_eq!(format_amount(0.0), "0.00");
    assert_eq!(format_amount(999.5), "999.50");
    assert_eq!(format_amount(1234.5), "1,234.50");
    assert_eq!(format_amount(1234567.891), "1,234,567.89");
    assert_eq!(format_amount(-2500.0), "-2,500.00");
    assert_eq!(format_amount(-0.001), "0.00");
}

#[test]
fn test_format_percent() {
    assert_eq!(format_percent(6.25), "+6.25%");
    assert_eq!(format_percent(-40.0), "-40.00%");
}

#[test]
fn test_parse_date_arg() {
    assert_eq!(commands::parse_date_arg(" 2024-03-05 ").unwrap(), day(5));
    assert!(commands::parse_date_arg("05/03/2024").is_err());
}

#[test]
fn test_raw_input_from_args_coerces_values() {
    let mut args = submit_args("SILOM", "2024-03-01", "6000", "10000");
    args.grab = Some(" 1500 ".to_string());
    args.line_man = Some("abc".to_string());

    let raw = commands::raw_input_from_args(&args);
    assert_eq!(raw.in_store_sales, 6000.0);
    assert_eq!(raw.target_sales, 10000.0);
    assert_eq!(raw.grab_sales, 1500.0);
    assert_eq!(raw.line_man_sales, 0.0);
    assert_eq!(raw.ta_sales, 0.0);
    assert_eq!(raw.num_bills, 10.0);
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_cli_parses_report_trend() {
    let cli = Cli::try_parse_from([
        "salesbook", "report", "trend", "-m", "3", "-y", "2024", "-b", "silom", "--json",
    ])
    .unwrap();

    match cli.command {
        Commands::Report {
            action: ReportAction::Trend { period, json },
        } => {
            assert_eq!(period.month, Some(3));
            assert_eq!(period.year, Some(2024));
            assert_eq!(period.branch, "silom");
            assert!(json);
        }
        _ => panic!("expected report trend"),
    }
}

#[test]
fn test_cli_period_defaults_to_all_branches() {
    let cli = Cli::try_parse_from(["salesbook", "--no-encrypt", "export"]).unwrap();
    assert!(cli.no_encrypt);
    match cli.command {
        Commands::Export { period, output } => {
            assert_eq!(period.branch, "all");
            assert!(period.month.is_none());
            assert!(output.is_none());
        }
        _ => panic!("expected export"),
    }
}

// ========== Record Command Tests ==========

#[test]
fn test_cmd_submit_stores_record() {
    let ledger = setup_test_ledger();
    let args = submit_args("silom", "2024-03-01", "6000", "10000");
    commands::cmd_submit(&ledger, &args).unwrap();

    let record = ledger.record("SILOM", day(1)).unwrap();
    assert_eq!(record.total_sales(), 6000.0);
    assert_eq!(record.metrics().sales_percentage, -40.0);
    assert_eq!(record.metrics().everest_per_bill, 600.0);
}

#[test]
fn test_cmd_submit_unknown_branch() {
    let ledger = setup_test_ledger();
    let args = submit_args("NOWHERE", "2024-03-01", "6000", "10000");
    assert!(commands::cmd_submit(&ledger, &args).is_err());
    assert_eq!(ledger.store().count_sales_records().unwrap(), 0);
}

#[test]
fn test_cmd_submit_invalid_date() {
    let ledger = setup_test_ledger();
    let args = submit_args("SILOM", "2024-13-01", "6000", "10000");
    assert!(commands::cmd_submit(&ledger, &args).is_err());
}

#[test]
fn test_cmd_submit_overwrites() {
    let ledger = setup_test_ledger();
    commands::cmd_submit(&ledger, &submit_args("SILOM", "2024-03-01", "6000", "10000")).unwrap();
    commands::cmd_submit(&ledger, &submit_args("SILOM", "2024-03-01", "9000", "10000")).unwrap();

    assert_eq!(ledger.store().count_sales_records().unwrap(), 1);
    assert_eq!(ledger.record("SILOM", day(1)).unwrap().total_sales(), 9000.0);
}

#[test]
fn test_cmd_records_list_and_show() {
    let ledger = setup_test_ledger();
    commands::cmd_submit(&ledger, &submit_args("SILOM", "2024-03-01", "6000", "10000")).unwrap();

    assert!(commands::cmd_records_list(&ledger, &march("all"), false).is_ok());
    assert!(commands::cmd_records_list(&ledger, &march("SILOM"), true).is_ok());
    assert!(commands::cmd_records_show(&ledger, "silom", "2024-03-01", false).is_ok());
}

#[test]
fn test_cmd_records_list_invalid_period() {
    let ledger = setup_test_ledger();
    let period = PeriodArgs {
        month: Some(13),
        year: Some(2024),
        branch: "all".to_string(),
    };
    assert!(commands::cmd_records_list(&ledger, &period, false).is_err());
    assert!(commands::cmd_records_list(&ledger, &march("NOWHERE"), false).is_err());
}

#[test]
fn test_cmd_records_show_missing() {
    let ledger = setup_test_ledger();
    assert!(commands::cmd_records_show(&ledger, "SILOM", "2024-03-01", false).is_err());
}

#[test]
fn test_cmd_records_delete() {
    let ledger = setup_test_ledger();
    commands::cmd_submit(&ledger, &submit_args("SILOM", "2024-03-01", "6000", "10000")).unwrap();

    commands::cmd_records_delete(&ledger, "silom", "2024-03-01").unwrap();
    assert!(ledger
        .store()
        .get_sales_record(&BranchCode::new("SILOM"), day(1))
        .unwrap()
        .is_none());

    // Deleting again is not an error
    assert!(commands::cmd_records_delete(&ledger, "SILOM", "2024-03-01").is_ok());
}

// ========== Report Tests ==========

#[test]
fn test_cmd_report_summary_empty() {
    let ledger = setup_test_ledger();
    assert!(commands::cmd_report_summary(&ledger, &march("all"), false).is_ok());
}

#[test]
fn test_cmd_report_summary_with_data() {
    let ledger = setup_test_ledger();
    commands::cmd_submit(&ledger, &submit_args("SILOM", "2024-03-01", "6000", "10000")).unwrap();
    commands::cmd_submit(&ledger, &submit_args("ARI", "2024-03-02", "8000", "10000")).unwrap();

    assert!(commands::cmd_report_summary(&ledger, &march("all"), false).is_ok());
    assert!(commands::cmd_report_summary(&ledger, &march("ARI"), true).is_ok());
}

#[test]
fn test_cmd_report_trend() {
    let ledger = setup_test_ledger();
    commands::cmd_submit(&ledger, &submit_args("SILOM", "2024-03-01", "6000", "10000")).unwrap();
    assert!(commands::cmd_report_trend(&ledger, &march("SILOM"), false).is_ok());

    commands::cmd_submit(&ledger, &submit_args("SILOM", "2024-03-02", "9000", "10000")).unwrap();
    assert!(commands::cmd_report_trend(&ledger, &march("SILOM"), false).is_ok());
    assert!(commands::cmd_report_trend(&ledger, &march("SILOM"), true).is_ok());
}

// ========== Import/Export Tests ==========

#[test]
fn test_import_file() {
    use std::io::Write;

    let ledger = setup_test_ledger();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "branch,date,target_sales,in_store_sales,num_bills").unwrap();
    writeln!(file, "SILOM,2024-03-01,10000,6000,12").unwrap();
    writeln!(file, "ari,2024-03-02,8000,8800,20").unwrap();
    writeln!(file, "NOWHERE,2024-03-02,8000,8800,20").unwrap();
    writeln!(file, "SILOM,not-a-date,1,1,1").unwrap();
    file.flush().unwrap();

    let stats = commands::import_file(&ledger, file.path()).unwrap();
    assert_eq!(stats.imported, 2);
    assert_eq!(stats.skipped.len(), 2);
    assert_eq!(ledger.store().count_sales_records().unwrap(), 2);
    assert_eq!(ledger.record("ARI", day(2)).unwrap().total_sales(), 8800.0);

    assert!(commands::cmd_import(&ledger, file.path()).is_ok());
}

#[test]
fn test_cmd_import_missing_file() {
    let ledger = setup_test_ledger();
    let dir = tempfile::tempdir().unwrap();
    assert!(commands::cmd_import(&ledger, &dir.path().join("missing.csv")).is_err());
}

#[test]
fn test_cmd_export_to_file() {
    let ledger = setup_test_ledger();
    commands::cmd_submit(&ledger, &submit_args("SILOM", "2024-03-01", "6000", "10000")).unwrap();
    commands::cmd_submit(&ledger, &submit_args("ARI", "2024-03-02", "8000", "10000")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("march.csv");
    commands::cmd_export(&ledger, &march("SILOM"), Some(&path)).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("branch,date"));
    assert!(lines[1].starts_with("SILOM,2024-03-01"));
}

#[test]
fn test_export_then_import_into_fresh_ledger() {
    let source = setup_test_ledger();
    commands::cmd_submit(&source, &submit_args("SILOM", "2024-03-01", "6000", "10000")).unwrap();
    commands::cmd_submit(&source, &submit_args("SILOM", "2024-03-02", "7000", "10000")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");
    commands::cmd_export(&source, &march("all"), Some(&path)).unwrap();

    let target = setup_test_ledger();
    let stats = commands::import_file(&target, &path).unwrap();
    assert_eq!(stats.imported, 2);
    assert!(stats.skipped.is_empty());
    let query = target.query(3, 2024, "all").unwrap();
    let imported = target.records(&query).unwrap();
    let original = source.records(&query).unwrap();
    assert_eq!(imported.len(), original.len());
    for (a, b) in imported.iter().zip(original.iter()) {
        assert_eq!(a.key(), b.key());
        assert_eq!(a.raw(), b.raw());
        assert_eq!(a.metrics(), b.metrics());
    }
}

// ========== Init Tests ==========

#[test]
fn test_cmd_init_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("salesbook.db");
    commands::cmd_init(&db_path, None, true).unwrap();
    assert!(db_path.exists());
}

#[test]
fn test_load_config_missing_path_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = commands::load_config(Some(&dir.path().join("missing.toml"))).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_load_config_without_branches() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "app_id = \"shop\"").unwrap();
    file.flush().unwrap();

    let config = commands::load_config(Some(file.path())).unwrap();
    assert_eq!(config.app_id, "shop");
    assert_eq!(config.branches, AppConfig::default().branches);
}

#[test]
fn test_cmd_branches() {
    assert!(commands::cmd_branches(&AppConfig::default()).is_ok());
}
