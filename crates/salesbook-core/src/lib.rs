//! Salesbook Core Library
//!
//! Shared functionality for the Salesbook branch sales tracker:
//! - Derived daily metrics from raw operator inputs
//! - Monthly aggregation by branch
//! - Heuristic trend analysis and narrative
//! - Record store abstraction with in-memory and SQLite backends
//! - CSV import and export

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod store;
pub mod trend;

pub use aggregate::{aggregate, filter_records, summarize};
pub use config::AppConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use export::{ImportStats, SkippedRow};
pub use ledger::{SalesLedger, SalesReport};
pub use metrics::compute;
pub use models::{
    BranchCode, BranchFilter, Channel, PeriodQuery, PeriodSummary, RawSalesInput, SalesMetrics,
    SalesRecord,
};
pub use store::{MemoryStore, RecordStore, SnapshotHandler};
pub use trend::{TrendAnalyzer, TrendReport, TrendThresholds};
