//! Trend analyzer - classifies a period and writes the narrative

use serde::Deserialize;
use tracing::debug;

use crate::models::{PeriodSummary, SalesRecord};

use super::types::{
    ChannelInsight, DayExtreme, PerformanceBand, TrendDirection, TrendReport, TrendStatus,
};

/// Second-half average must exceed the first by this factor to count as increasing
pub const INCREASE_RATIO: f64 = 1.1;
/// Second-half average below the first times this factor counts as decreasing
pub const DECREASE_RATIO: f64 = 0.9;
/// Sales percentage at or above which performance is excellent
pub const EXCELLENT_PERCENT: f64 = 10.0;
/// Sales percentage at or above which performance is at target
pub const AT_TARGET_PERCENT: f64 = 0.0;
/// Sales percentage at or above which performance is only slightly below target
pub const SLIGHTLY_BELOW_PERCENT: f64 = -10.0;
/// Minimum delivery share of total sales for a delivery-growth insight
pub const DELIVERY_SHARE: f64 = 0.3;
/// Minimum in-store share of total sales for an in-store-dominance insight
pub const IN_STORE_SHARE: f64 = 0.5;
/// Fewest records that can be classified
pub const MIN_RECORDS: usize = 2;

/// Heuristic thresholds for trend classification
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    pub increase_ratio: f64,
    pub decrease_ratio: f64,
    pub excellent_percent: f64,
    pub at_target_percent: f64,
    pub slightly_below_percent: f64,
    pub delivery_share: f64,
    pub in_store_share: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            increase_ratio: INCREASE_RATIO,
            decrease_ratio: DECREASE_RATIO,
            excellent_percent: EXCELLENT_PERCENT,
            at_target_percent: AT_TARGET_PERCENT,
            slightly_below_percent: SLIGHTLY_BELOW_PERCENT,
            delivery_share: DELIVERY_SHARE,
            in_store_share: IN_STORE_SHARE,
        }
    }
}

/// Produces [`TrendReport`]s from filtered, date-sorted records
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    thresholds: TrendThresholds,
}

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: TrendThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &TrendThresholds {
        &self.thresholds
    }

    /// Analyze a period
    ///
    /// `records` must be the same filtered set the summary was built from,
    /// in ascending date order.
    pub fn analyze(&self, records: &[SalesRecord], summary: &PeriodSummary) -> TrendReport {
        if records.len() < MIN_RECORDS {
            debug!(count = records.len(), "Too few records for trend analysis");
            return TrendReport::insufficient(records.len());
        }

        let (first_half_avg, second_half_avg) = half_averages(records);
        let trend = self.classify_trend(first_half_avg, second_half_avg);
        let band = self.performance_band(summary.monthly_sales_percentage);
        let channel = self.channel_insight(summary);
        // Non-empty, checked above
        let best = extreme(records, |candidate, current| candidate > current);
        let worst = extreme(records, |candidate, current| candidate < current);

        let mut insights = vec![
            trend_sentence(trend, first_half_avg, second_half_avg),
            format!(
                "Performance is {} ({:+.2}% vs target).",
                band.label(),
                summary.monthly_sales_percentage
            ),
        ];
        if let Some(channel) = channel {
            insights.push(channel_sentence(channel, summary));
        }
        insights.push(format!(
            "Best day: {} ({}) with {:.2}. Lowest day: {} ({}) with {:.2}.",
            best.date, best.branch, best.total_sales, worst.date, worst.branch, worst.total_sales
        ));

        debug!(
            trend = trend.as_str(),
            band = band.as_str(),
            channel = channel.map(|c| c.as_str()),
            "Trend analysis complete"
        );

        TrendReport {
            status: TrendStatus::Analyzed,
            record_count: records.len(),
            trend: Some(trend),
            first_half_avg: Some(first_half_avg),
            second_half_avg: Some(second_half_avg),
            band: Some(band),
            channel,
            best_day: Some(best),
            worst_day: Some(worst),
            narrative: insights.join(" "),
            insights,
        }
    }

    pub fn classify_trend(&self, first_half_avg: f64, second_half_avg: f64) -> TrendDirection {
        if second_half_avg > first_half_avg * self.thresholds.increase_ratio {
            TrendDirection::Increasing
        } else if second_half_avg < first_half_avg * self.thresholds.decrease_ratio {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    pub fn performance_band(&self, sales_percentage: f64) -> PerformanceBand {
        if sales_percentage >= self.thresholds.excellent_percent {
            PerformanceBand::Excellent
        } else if sales_percentage >= self.thresholds.at_target_percent {
            PerformanceBand::AtTarget
        } else if sales_percentage >= self.thresholds.slightly_below_percent {
            PerformanceBand::SlightlyBelow
        } else {
            PerformanceBand::SignificantlyBelow
        }
    }

    pub fn channel_insight(&self, summary: &PeriodSummary) -> Option<ChannelInsight> {
        let in_store = summary.channels.in_store;
        let delivery = summary.channels.delivery();
        let total = summary.monthly_total_sales;

        if delivery > in_store && delivery > self.thresholds.delivery_share * total {
            Some(ChannelInsight::DeliveryGrowth)
        } else if in_store > self.thresholds.in_store_share * total {
            Some(ChannelInsight::InStoreDominance)
        } else {
            None
        }
    }
}

/// Average total sales of each half, split at `floor(n / 2)`
///
/// With an odd count the second half gets the extra record.
pub fn half_averages(records: &[SalesRecord]) -> (f64, f64) {
    let mid = records.len() / 2;
    let (first, second) = records.split_at(mid);
    (average_total(first), average_total(second))
}

fn average_total(records: &[SalesRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.total_sales()).sum::<f64>() / records.len() as f64
}

/// Linear scan seeded with the first record; ties keep the earlier record
fn extreme<F>(records: &[SalesRecord], replaces: F) -> DayExtreme
where
    F: Fn(f64, f64) -> bool,
{
    let mut chosen = &records[0];
    for record in &records[1..] {
        if replaces(record.total_sales(), chosen.total_sales()) {
            chosen = record;
        }
    }
    DayExtreme {
        date: chosen.date(),
        branch: chosen.branch().clone(),
        total_sales: chosen.total_sales(),
    }
}

fn trend_sentence(trend: TrendDirection, first: f64, second: f64) -> String {
    let lead = match trend {
        TrendDirection::Increasing => "Sales are trending upward",
        TrendDirection::Decreasing => "Sales are trending downward",
        TrendDirection::Stable => "Sales are stable",
    };
    format!(
        "{}: the second half of the period averaged {:.2} per day against {:.2} in the first half.",
        lead, second, first
    )
}

fn channel_sentence(channel: ChannelInsight, summary: &PeriodSummary) -> String {
    let total = summary.monthly_total_sales;
    match channel {
        ChannelInsight::DeliveryGrowth => format!(
            "Delivery (Grab and LINE MAN) is outselling in-store at {:.1}% of sales.",
            share(summary.channels.delivery(), total)
        ),
        ChannelInsight::InStoreDominance => format!(
            "In-store sales dominate at {:.1}% of sales.",
            share(summary.channels.in_store, total)
        ),
    }
}

fn share(amount: f64, total: f64) -> f64 {
    crate::metrics::ratio(amount, total) * 100.0
}
