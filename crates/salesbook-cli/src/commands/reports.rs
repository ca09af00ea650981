//! Report command implementations

use anyhow::Result;
use salesbook_core::{db::Database, PeriodSummary, SalesLedger, TrendReport};

use super::{format_amount, format_percent, period_query};
use crate::cli::PeriodArgs;

pub fn cmd_report_summary(
    ledger: &SalesLedger<Database>,
    period: &PeriodArgs,
    json: bool,
) -> Result<()> {
    let query = period_query(ledger, period)?;
    let summary = ledger.summary(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(&summary);
    Ok(())
}

pub fn cmd_report_trend(
    ledger: &SalesLedger<Database>,
    period: &PeriodArgs,
    json: bool,
) -> Result<()> {
    let query = period_query(ledger, period)?;
    let report = ledger.report(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "📈 Trend for {} ({})",
        query.label(),
        report.summary.branch
    );
    println!("   ─────────────────────────────");
    print_trend(&report.trend);
    Ok(())
}

fn print_summary(summary: &PeriodSummary) {
    println!(
        "📊 Sales summary for {:04}-{:02} ({})",
        summary.year, summary.month, summary.branch
    );
    println!("   ─────────────────────────────");

    if summary.no_data {
        println!("   No data for this period.");
        return;
    }

    println!("   Days recorded:   {}", summary.record_count);
    println!(
        "   Total sales:     {:>14}",
        format_amount(summary.monthly_total_sales)
    );
    println!(
        "   Target:          {:>14}",
        format_amount(summary.monthly_target_sales)
    );
    println!(
        "   Difference:      {:>14}  ({})",
        format_amount(summary.monthly_sales_difference),
        format_percent(summary.monthly_sales_percentage)
    );
    println!(
        "   Per bill:        {:>14}  ({} bills)",
        format_amount(summary.everest_per_bill),
        summary.monthly_bills
    );
    println!(
        "   Per head:        {:>14}  ({} customers)",
        format_amount(summary.everest_per_head),
        summary.monthly_customers
    );

    if !summary.channel_shares.is_empty() {
        println!();
        println!("   Channels:");
        for share in &summary.channel_shares {
            println!(
                "     {:<10} {:>14}  {:>6.1}%",
                share.label,
                format_amount(share.amount),
                share.percentage
            );
        }
    }

    if summary.branch_totals.len() > 1 {
        println!();
        println!("   Branches:");
        for total in &summary.branch_totals {
            println!(
                "     {:<10} {:>14}  {:>9}  ({} days)",
                total.branch.as_str(),
                format_amount(total.total_sales),
                format_percent(total.sales_percentage),
                total.days
            );
        }
    }
}

fn print_trend(trend: &TrendReport) {
    if trend.is_insufficient() {
        println!("   {}", trend.narrative);
        return;
    }

    if let (Some(direction), Some(first), Some(second)) =
        (trend.trend, trend.first_half_avg, trend.second_half_avg)
    {
        println!(
            "   Trajectory: {} ({} → {} per day)",
            direction,
            format_amount(first),
            format_amount(second)
        );
    }
    if let Some(band) = trend.band {
        println!("   Performance: {}", band.label());
    }
    if let Some(channel) = trend.channel {
        println!("   Channel: {}", channel);
    }

    println!();
    for insight in &trend.insights {
        println!("   • {}", insight);
    }
}
