//! Core types for trend reports

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::BranchCode;

/// Message used when there are too few records to classify a trend
pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "Not enough data to analyze trends. At least 2 days of records are needed.";

/// Trajectory of daily sales across the period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the period's sales percentage lands relative to target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    /// At least 10% above target
    Excellent,
    /// Between 0% and 10% above target
    AtTarget,
    /// Up to 10% below target
    SlightlyBelow,
    /// More than 10% below target
    SignificantlyBelow,
}

impl PerformanceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "excellent",
            PerformanceBand::AtTarget => "at_target",
            PerformanceBand::SlightlyBelow => "slightly_below",
            PerformanceBand::SignificantlyBelow => "significantly_below",
        }
    }

    /// Phrase used in the narrative
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "excellent, well above target",
            PerformanceBand::AtTarget => "at target",
            PerformanceBand::SlightlyBelow => "slightly below target",
            PerformanceBand::SignificantlyBelow => "significantly below target",
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notable channel mix for the period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelInsight {
    /// Delivery (Grab + LINE MAN) outsells in-store and is a large share
    DeliveryGrowth,
    /// In-store is more than half of all sales
    InStoreDominance,
}

impl ChannelInsight {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelInsight::DeliveryGrowth => "delivery_growth",
            ChannelInsight::InStoreDominance => "in_store_dominance",
        }
    }
}

impl fmt::Display for ChannelInsight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The best or worst day in a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayExtreme {
    pub date: NaiveDate,
    pub branch: BranchCode,
    pub total_sales: f64,
}

/// Whether a report carries an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    InsufficientData,
    Analyzed,
}

/// Trend analysis output
///
/// `narrative` is the text shown to operators; the other fields carry the
/// same facts in structured form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub status: TrendStatus,
    pub record_count: usize,
    pub trend: Option<TrendDirection>,
    pub first_half_avg: Option<f64>,
    pub second_half_avg: Option<f64>,
    pub band: Option<PerformanceBand>,
    pub channel: Option<ChannelInsight>,
    pub best_day: Option<DayExtreme>,
    pub worst_day: Option<DayExtreme>,
    /// Individual narrative sentences, in output order
    pub insights: Vec<String>,
    pub narrative: String,
}

impl TrendReport {
    /// The fixed report for fewer than two records
    pub fn insufficient(record_count: usize) -> Self {
        Self {
            status: TrendStatus::InsufficientData,
            record_count,
            trend: None,
            first_half_avg: None,
            second_half_avg: None,
            band: None,
            channel: None,
            best_day: None,
            worst_day: None,
            insights: vec![],
            narrative: INSUFFICIENT_DATA_MESSAGE.to_string(),
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.status == TrendStatus::InsufficientData
    }
}
