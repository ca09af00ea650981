//! Daily sales record operations

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::metrics::compute;
use crate::models::{record_key, BranchCode, BranchFilter, PeriodQuery, RawSalesInput, SalesRecord};
use crate::store::{RecordStore, SnapshotHandler};

const SELECT_COLUMNS: &str = "branch, date, target_sales, in_store_sales, ta_sales, grab_sales,
    line_man_sales, num_bills, num_customers, target_everest_per_bill, target_everest_per_head,
    last_updated";

/// First day of the query month and first day of the following month
fn month_bounds(query: &PeriodQuery) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(query.year, query.month, 1)
        .ok_or_else(|| Error::InvalidPeriod(query.label()))?;
    let (next_year, next_month) = if query.month == 12 {
        (query.year + 1, 1)
    } else {
        (query.year, query.month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| Error::InvalidPeriod(query.label()))?;
    Ok((start, end))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Database {
    /// Insert or replace the record for its branch and date
    pub fn upsert_sales_record(&self, record: &SalesRecord) -> Result<()> {
        let conn = self.conn()?;
        let raw = record.raw();
        let m = record.metrics();

        conn.execute(
            r#"
            INSERT INTO sales_records (
                record_key, branch, date,
                target_sales, in_store_sales, ta_sales, grab_sales, line_man_sales,
                num_bills, num_customers, target_everest_per_bill, target_everest_per_head,
                total_sales, sales_difference, sales_percentage,
                everest_per_bill, everest_per_bill_difference, everest_per_bill_percentage,
                everest_per_head, everest_per_head_difference, everest_per_head_percentage,
                last_updated
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21, ?22)
            ON CONFLICT(record_key) DO UPDATE SET
                target_sales = excluded.target_sales,
                in_store_sales = excluded.in_store_sales,
                ta_sales = excluded.ta_sales,
                grab_sales = excluded.grab_sales,
                line_man_sales = excluded.line_man_sales,
                num_bills = excluded.num_bills,
                num_customers = excluded.num_customers,
                target_everest_per_bill = excluded.target_everest_per_bill,
                target_everest_per_head = excluded.target_everest_per_head,
                total_sales = excluded.total_sales,
                sales_difference = excluded.sales_difference,
                sales_percentage = excluded.sales_percentage,
                everest_per_bill = excluded.everest_per_bill,
                everest_per_bill_difference = excluded.everest_per_bill_difference,
                everest_per_bill_percentage = excluded.everest_per_bill_percentage,
                everest_per_head = excluded.everest_per_head,
                everest_per_head_difference = excluded.everest_per_head_difference,
                everest_per_head_percentage = excluded.everest_per_head_percentage,
                last_updated = excluded.last_updated
            "#,
            params![
                record.key(),
                record.branch().as_str(),
                format_date(record.date()),
                raw.target_sales,
                raw.in_store_sales,
                raw.ta_sales,
                raw.grab_sales,
                raw.line_man_sales,
                raw.num_bills,
                raw.num_customers,
                raw.target_everest_per_bill,
                raw.target_everest_per_head,
                m.total_sales,
                m.sales_difference,
                m.sales_percentage,
                m.everest_per_bill,
                m.everest_per_bill_difference,
                m.everest_per_bill_percentage,
                m.everest_per_head,
                m.everest_per_head_difference,
                m.everest_per_head_percentage,
                record.last_updated().to_rfc3339(),
            ],
        )?;

        debug!(key = %record.key(), "Upserted sales record");
        Ok(())
    }

    /// List records, optionally restricted to a period query
    ///
    /// Ordered by date, then branch code.
    pub fn list_sales_records(&self, query: Option<&PeriodQuery>) -> Result<Vec<SalesRecord>> {
        let conn = self.conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(query) = query {
            let (start, end) = month_bounds(query)?;
            conditions.push("date >= ? AND date < ?");
            params.push(format_date(start));
            params.push(format_date(end));

            if let BranchFilter::Branch(branch) = &query.branch {
                conditions.push("branch = ?");
                params.push(branch.as_str().to_string());
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM sales_records {} ORDER BY date ASC, branch ASC",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Self::row_to_sales_record(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get the record for a branch and date
    pub fn get_sales_record(&self, branch: &BranchCode, date: NaiveDate) -> Result<Option<SalesRecord>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM sales_records WHERE record_key = ?", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![record_key(branch, date)], |row| {
                Self::row_to_sales_record(row)
            })
            .optional()?;
        Ok(record)
    }

    /// Delete the record for a branch and date
    ///
    /// Returns whether a row was removed. Listeners are notified only when
    /// something changed.
    pub fn delete_sales_record(&self, branch: &BranchCode, date: NaiveDate) -> Result<bool> {
        let key = record_key(branch, date);
        let removed = {
            let conn = self.conn()?;
            conn.execute("DELETE FROM sales_records WHERE record_key = ?", params![key])?
        };

        if removed > 0 {
            info!(key = %key, "Deleted sales record");
            self.notify_listeners()?;
        }
        Ok(removed > 0)
    }

    /// Count stored records
    pub fn count_sales_records(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM sales_records", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Rebuild a record from its raw columns
    /// Column order matches `SELECT_COLUMNS`
    fn row_to_sales_record(row: &rusqlite::Row) -> rusqlite::Result<SalesRecord> {
        let branch: String = row.get(0)?;
        let date_str: String = row.get(1)?;
        let last_updated_str: String = row.get(11)?;

        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let raw = RawSalesInput {
            target_sales: row.get(2)?,
            in_store_sales: row.get(3)?,
            ta_sales: row.get(4)?,
            grab_sales: row.get(5)?,
            line_man_sales: row.get(6)?,
            num_bills: row.get(7)?,
            num_customers: row.get(8)?,
            target_everest_per_bill: row.get(9)?,
            target_everest_per_head: row.get(10)?,
        };
        let last_updated: DateTime<Utc> = parse_datetime(&last_updated_str);

        Ok(compute(BranchCode::new(&branch), date, &raw, last_updated))
    }

    fn notify_listeners(&self) -> Result<()> {
        if self.listeners().is_empty() {
            return Ok(());
        }
        let snapshot = self.list_sales_records(None)?;
        self.listeners().notify(&snapshot);
        Ok(())
    }
}

impl RecordStore for Database {
    fn upsert(&self, record: &SalesRecord) -> Result<()> {
        self.upsert_sales_record(record)?;
        self.notify_listeners()
    }

    fn current_snapshot(&self) -> Result<Vec<SalesRecord>> {
        self.list_sales_records(None)
    }

    fn on_snapshot_change(&self, handler: SnapshotHandler) {
        self.listeners().add(handler);
    }

    fn get(&self, branch: &BranchCode, date: NaiveDate) -> Result<Option<SalesRecord>> {
        self.get_sales_record(branch, date)
    }
}
