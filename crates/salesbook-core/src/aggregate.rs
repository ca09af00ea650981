//! Period aggregation
//!
//! Filters a snapshot of records down to one month (optionally one branch),
//! orders it by date, and rolls it up into a [`PeriodSummary`].

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::metrics::{percent_of_target, ratio};
use crate::models::{
    BranchCode, BranchFilter, BranchTotal, Channel, ChannelBreakdown, ChannelShare, PeriodQuery,
    PeriodSummary, SalesRecord, SeriesPoint,
};

/// Whether a record falls inside the query's month, year and branch
pub fn matches(record: &SalesRecord, query: &PeriodQuery) -> bool {
    let date = record.date();
    date.month() == query.month && date.year() == query.year && query.branch.matches(record.branch())
}

/// Select the records for a query, sorted by date ascending
///
/// Same-day records (only possible with the `All` filter) are ordered by
/// branch code so the output does not depend on feed order.
pub fn filter_records(records: &[SalesRecord], query: &PeriodQuery) -> Vec<SalesRecord> {
    let mut filtered: Vec<SalesRecord> = records
        .iter()
        .filter(|r| matches(r, query))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| {
        a.date()
            .cmp(&b.date())
            .then_with(|| a.branch().cmp(b.branch()))
    });
    filtered
}

/// Channel slices with a non-zero sum, as a share of period sales
pub fn channel_shares(channels: &ChannelBreakdown, total_sales: f64) -> Vec<ChannelShare> {
    Channel::all()
        .iter()
        .filter_map(|&channel| {
            let amount = channels.amount(channel);
            if amount == 0.0 {
                return None;
            }
            Some(ChannelShare {
                channel,
                label: channel.label(),
                amount,
                percentage: ratio(amount, total_sales) * 100.0,
            })
        })
        .collect()
}

/// Summarize already-filtered, date-sorted records
pub fn summarize(sorted: &[SalesRecord], query: &PeriodQuery) -> PeriodSummary {
    if sorted.is_empty() {
        return PeriodSummary::empty(query);
    }

    let mut total_sales = 0.0;
    let mut target_sales = 0.0;
    let mut bills = 0.0;
    let mut customers = 0.0;
    let mut channels = ChannelBreakdown::default();
    let mut per_branch: BTreeMap<&BranchCode, (usize, f64, f64)> = BTreeMap::new();

    for record in sorted {
        let raw = record.raw();
        total_sales += record.total_sales();
        target_sales += raw.target_sales;
        bills += raw.num_bills;
        customers += raw.num_customers;

        channels.in_store += raw.in_store_sales;
        channels.takeaway += raw.ta_sales;
        channels.grab += raw.grab_sales;
        channels.line_man += raw.line_man_sales;

        let entry = per_branch.entry(record.branch()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += record.total_sales();
        entry.2 += raw.target_sales;
    }

    let difference = total_sales - target_sales;

    let branch_totals = per_branch
        .into_iter()
        .map(|(branch, (days, total, target))| BranchTotal {
            branch: branch.clone(),
            days,
            total_sales: total,
            target_sales: target,
            sales_percentage: percent_of_target(total - target, target),
        })
        .collect();

    let series = sorted
        .iter()
        .map(|r| SeriesPoint {
            date: r.date(),
            branch: r.branch().clone(),
            total_sales: r.total_sales(),
            target_sales: r.target_sales(),
            sales_percentage: r.metrics().sales_percentage,
            everest_per_bill: r.metrics().everest_per_bill,
            everest_per_head: r.metrics().everest_per_head,
        })
        .collect();

    PeriodSummary {
        month: query.month,
        year: query.year,
        branch: query.branch.clone(),
        no_data: false,
        record_count: sorted.len(),
        monthly_total_sales: total_sales,
        monthly_target_sales: target_sales,
        monthly_sales_difference: difference,
        monthly_sales_percentage: percent_of_target(difference, target_sales),
        monthly_bills: bills,
        monthly_customers: customers,
        everest_per_bill: ratio(total_sales, bills),
        everest_per_head: ratio(total_sales, customers),
        channels,
        channel_shares: channel_shares(&channels, total_sales),
        branch_totals,
        series,
    }
}

/// Filter, sort and summarize a snapshot for a period query
pub fn aggregate(records: &[SalesRecord], query: &PeriodQuery) -> PeriodSummary {
    let filtered = filter_records(records, query);
    debug!(
        period = %query.label(),
        branch = %query.branch,
        matched = filtered.len(),
        total = records.len(),
        "Aggregating period"
    );
    summarize(&filtered, query)
}

/// Convenience for the common "one branch" query
pub fn branch_query(month: u32, year: i32, branch: &str) -> crate::Result<PeriodQuery> {
    PeriodQuery::new(month, year, BranchFilter::Branch(BranchCode::new(branch)))
}
