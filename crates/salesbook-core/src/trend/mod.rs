//! Trend Analysis - heuristic narrative for a sales period
//!
//! Works on the same filtered, date-sorted records the aggregator used and
//! produces:
//!
//! - **Trajectory** - second half of the period against the first half
//! - **Performance band** - period sales percentage against target
//! - **Channel insight** - delivery growth or in-store dominance
//! - **Extremes** - best and lowest day
//!
//! ## Usage
//!
//! ```rust,ignore
//! use salesbook_core::trend::TrendAnalyzer;
//!
//! let sorted = filter_records(&snapshot, &query);
//! let summary = summarize(&sorted, &query);
//! let report = TrendAnalyzer::new().analyze(&sorted, &summary);
//! println!("{}", report.narrative);
//! ```

pub mod analyzer;
pub mod types;

pub use analyzer::{half_averages, TrendAnalyzer, TrendThresholds};
pub use types::{
    ChannelInsight, DayExtreme, PerformanceBand, TrendDirection, TrendReport, TrendStatus,
    INSUFFICIENT_DATA_MESSAGE,
};
