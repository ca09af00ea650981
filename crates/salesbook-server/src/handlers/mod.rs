//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod branches;
pub mod records;
pub mod reports;

// Re-export all handlers for use in router
pub use branches::*;
pub use records::*;
pub use reports::*;

use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::AppError;
use salesbook_core::{Database, PeriodQuery, SalesLedger};

/// Query parameters selecting a month and branch
///
/// Month and year default to the current UTC month; branch defaults to `all`.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
    pub month: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
}

impl PeriodParams {
    pub fn resolve(&self, ledger: &SalesLedger<Database>) -> Result<PeriodQuery, AppError> {
        let today = Utc::now().date_naive();

        let month = match self.month.as_deref() {
            Some(m) => m
                .trim()
                .parse::<u32>()
                .map_err(|_| AppError::bad_request(&format!("Invalid month: {}", m)))?,
            None => today.month(),
        };
        let year = match self.year.as_deref() {
            Some(y) => y
                .trim()
                .parse::<i32>()
                .map_err(|_| AppError::bad_request(&format!("Invalid year: {}", y)))?,
            None => today.year(),
        };
        let branch = self.branch.as_deref().unwrap_or("all");

        Ok(ledger.query(month, year, branch)?)
    }
}
