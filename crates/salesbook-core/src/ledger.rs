//! Sales ledger - ingestion and query facade
//!
//! Ties configuration, a [`RecordStore`] and the pure metric, aggregation
//! and trend functions together. The CLI and the REST API both go through
//! this type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::aggregate::{filter_records, summarize};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::metrics::compute;
use crate::models::{BranchCode, PeriodQuery, PeriodSummary, RawSalesInput, SalesRecord};
use crate::store::RecordStore;
use crate::trend::{TrendAnalyzer, TrendReport};

/// Period summary and trend report for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub summary: PeriodSummary,
    pub trend: TrendReport,
}

pub struct SalesLedger<S: RecordStore> {
    config: AppConfig,
    store: S,
    analyzer: TrendAnalyzer,
}

impl<S: RecordStore> SalesLedger<S> {
    pub fn new(config: AppConfig, store: S) -> Self {
        let analyzer = TrendAnalyzer::with_thresholds(config.thresholds.clone());
        Self {
            config,
            store,
            analyzer,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configured branch codes
    pub fn branches(&self) -> &[BranchCode] {
        &self.config.branches
    }

    /// Record a day's sales for a branch, stamped with the current time
    ///
    /// Unknown branch codes are rejected. Numeric input is never rejected;
    /// it was already coerced when the [`RawSalesInput`] was built.
    pub fn submit(&self, branch: &str, date: NaiveDate, raw: &RawSalesInput) -> Result<SalesRecord> {
        self.submit_at(branch, date, raw, Utc::now())
    }

    /// Record a day's sales with an explicit write timestamp
    pub fn submit_at(
        &self,
        branch: &str,
        date: NaiveDate,
        raw: &RawSalesInput,
        last_updated: DateTime<Utc>,
    ) -> Result<SalesRecord> {
        let branch = self.config.resolve_branch(branch)?;
        let record = compute(branch, date, raw, last_updated);
        self.store.upsert(&record)?;

        info!(
            key = %record.key(),
            total_sales = record.total_sales(),
            "Recorded daily sales"
        );
        Ok(record)
    }

    /// Build a validated query from loose parameters
    ///
    /// `branch` is a configured code or `all`.
    pub fn query(&self, month: u32, year: i32, branch: &str) -> Result<PeriodQuery> {
        let filter = self.config.resolve_filter(branch)?;
        PeriodQuery::new(month, year, filter)
    }

    /// Records matching a query, in ascending date order
    pub fn records(&self, query: &PeriodQuery) -> Result<Vec<SalesRecord>> {
        let snapshot = self.store.current_snapshot()?;
        Ok(filter_records(&snapshot, query))
    }

    /// One record by branch and date
    pub fn record(&self, branch: &str, date: NaiveDate) -> Result<SalesRecord> {
        let branch = self.config.resolve_branch(branch)?;
        self.store
            .get(&branch, date)?
            .ok_or_else(|| Error::NotFound(format!("No record for {} on {}", branch, date)))
    }

    /// Aggregate a period
    pub fn summary(&self, query: &PeriodQuery) -> Result<PeriodSummary> {
        let sorted = self.records(query)?;
        Ok(summarize(&sorted, query))
    }

    /// Aggregate a period and analyze its trend from the same filtered set
    pub fn report(&self, query: &PeriodQuery) -> Result<SalesReport> {
        let sorted = self.records(query)?;
        let summary = summarize(&sorted, query);
        let trend = self.analyzer.analyze(&sorted, &summary);
        Ok(SalesReport { summary, trend })
    }
}
