//! Daily record commands (submit, list, show, delete)

use anyhow::{Context, Result};
use chrono::Utc;
use salesbook_core::{db::Database, BranchCode, RawSalesInput, SalesLedger, SalesRecord};

use super::{format_amount, format_percent, parse_date_arg, period_query};
use crate::cli::{PeriodArgs, SubmitArgs};

/// Collect the raw inputs given on the command line
pub fn raw_input_from_args(args: &SubmitArgs) -> RawSalesInput {
    let fields = [
        ("target_sales", &args.target_sales),
        ("in_store_sales", &args.in_store),
        ("ta_sales", &args.takeaway),
        ("grab_sales", &args.grab),
        ("line_man_sales", &args.line_man),
        ("num_bills", &args.bills),
        ("num_customers", &args.customers),
        ("target_everest_per_bill", &args.target_per_bill),
        ("target_everest_per_head", &args.target_per_head),
    ];
    RawSalesInput::from_fields(
        fields
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v))),
    )
}

pub fn cmd_submit(ledger: &SalesLedger<Database>, args: &SubmitArgs) -> Result<()> {
    let date = match &args.date {
        Some(date) => parse_date_arg(date)?,
        None => Utc::now().date_naive(),
    };
    let raw = raw_input_from_args(args);

    let record = ledger
        .submit(&args.branch, date, &raw)
        .context("Failed to record sales")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("✅ Recorded {} for {}", record.branch(), record.date());
    print_record(&record);
    Ok(())
}

pub fn cmd_records_list(
    ledger: &SalesLedger<Database>,
    period: &PeriodArgs,
    json: bool,
) -> Result<()> {
    let query = period_query(ledger, period)?;
    let records = ledger.records(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records for {} ({}).", query.label(), query.branch);
        return Ok(());
    }

    println!("📒 Records for {} ({})", query.label(), query.branch);
    println!();
    println!(
        "   {:<10}  {:<10}  {:>14}  {:>14}  {:>9}  {:>10}",
        "Date", "Branch", "Total", "Target", "vs Target", "Per bill"
    );
    println!("   {}", "─".repeat(76));
    for record in &records {
        let m = record.metrics();
        println!(
            "   {:<10}  {:<10}  {:>14}  {:>14}  {:>9}  {:>10}",
            record.date().format("%Y-%m-%d").to_string(),
            record.branch().as_str(),
            format_amount(m.total_sales),
            format_amount(record.target_sales()),
            format_percent(m.sales_percentage),
            format_amount(m.everest_per_bill),
        );
    }
    println!();
    println!("   {} record(s)", records.len());

    Ok(())
}

pub fn cmd_records_show(
    ledger: &SalesLedger<Database>,
    branch: &str,
    date: &str,
    json: bool,
) -> Result<()> {
    let date = parse_date_arg(date)?;
    let record = ledger.record(branch, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("📄 {} on {}", record.branch(), record.date());
    print_record(&record);
    Ok(())
}

pub fn cmd_records_delete(ledger: &SalesLedger<Database>, branch: &str, date: &str) -> Result<()> {
    let date = parse_date_arg(date)?;
    let branch = BranchCode::new(branch);

    if ledger.store().delete_sales_record(&branch, date)? {
        tracing::info!(branch = %branch, %date, "Deleted sales record");
        println!("🗑️  Deleted record for {} on {}", branch, date);
    } else {
        tracing::warn!(branch = %branch, %date, "No sales record to delete");
        println!("No record for {} on {}", branch, date);
    }
    Ok(())
}

fn print_record(record: &SalesRecord) {
    let raw = record.raw();
    let m = record.metrics();

    println!("   ─────────────────────────────");
    println!("   In-store:      {:>14}", format_amount(raw.in_store_sales));
    println!("   Takeaway:      {:>14}", format_amount(raw.ta_sales));
    println!("   Grab:          {:>14}", format_amount(raw.grab_sales));
    println!("   LINE MAN:      {:>14}", format_amount(raw.line_man_sales));
    println!("   Total:         {:>14}", format_amount(m.total_sales));
    println!(
        "   Target:        {:>14}  ({} {})",
        format_amount(raw.target_sales),
        format_amount(m.sales_difference),
        format_percent(m.sales_percentage)
    );
    println!(
        "   Per bill:      {:>14}  ({} bills, {} vs target)",
        format_amount(m.everest_per_bill),
        raw.num_bills,
        format_percent(m.everest_per_bill_percentage)
    );
    println!(
        "   Per head:      {:>14}  ({} customers, {} vs target)",
        format_amount(m.everest_per_head),
        raw.num_customers,
        format_percent(m.everest_per_head_percentage)
    );
    println!(
        "   Updated:       {}",
        record.last_updated().format("%Y-%m-%d %H:%M:%S UTC")
    );
}
