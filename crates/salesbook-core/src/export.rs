//! CSV export and import for daily sales
//!
//! Supports:
//! - Record export (raw inputs and derived figures) for any filtered set
//! - Bulk import of raw daily inputs, each row going through the ledger
//!
//! Import columns are `branch,date` followed by the raw input fields
//! (`target_sales,in_store_sales,...`). Headers may use snake_case or
//! camelCase, column order is free, and missing numeric columns read as 0.

use std::io::{Read, Write};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::ledger::SalesLedger;
use crate::models::{RawSalesInput, SalesRecord};
use crate::store::RecordStore;

/// Header row written by [`export_records_csv`]
pub const EXPORT_HEADER: [&str; 21] = [
    "branch",
    "date",
    "target_sales",
    "in_store_sales",
    "ta_sales",
    "grab_sales",
    "line_man_sales",
    "num_bills",
    "num_customers",
    "target_everest_per_bill",
    "target_everest_per_head",
    "total_sales",
    "sales_difference",
    "sales_percentage",
    "everest_per_bill",
    "everest_per_bill_difference",
    "everest_per_bill_percentage",
    "everest_per_head",
    "everest_per_head_difference",
    "everest_per_head_percentage",
    "last_updated",
];

/// Write records as CSV, returning the number of rows written
pub fn export_records_csv<W: Write>(records: &[SalesRecord], writer: W) -> Result<usize> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(EXPORT_HEADER)?;

    for record in records {
        let raw = record.raw();
        let m = record.metrics();
        let inputs = [
            raw.target_sales,
            raw.in_store_sales,
            raw.ta_sales,
            raw.grab_sales,
            raw.line_man_sales,
            raw.num_bills,
            raw.num_customers,
            raw.target_everest_per_bill,
            raw.target_everest_per_head,
        ];
        let derived = [
            m.total_sales,
            m.sales_difference,
            m.sales_percentage,
            m.everest_per_bill,
            m.everest_per_bill_difference,
            m.everest_per_bill_percentage,
            m.everest_per_head,
            m.everest_per_head_difference,
            m.everest_per_head_percentage,
        ];

        let mut row = Vec::with_capacity(EXPORT_HEADER.len());
        row.push(record.branch().to_string());
        row.push(record.date().format("%Y-%m-%d").to_string());
        // Inputs keep full precision so an export can be imported again
        row.extend(inputs.iter().map(|n| n.to_string()));
        row.extend(derived.iter().map(|n| format_number(*n)));
        row.push(record.last_updated().to_rfc3339());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(records.len())
}

/// Export to an in-memory string
pub fn export_records_csv_string(records: &[SalesRecord]) -> Result<String> {
    let mut buf = Vec::new();
    export_records_csv(records, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::InvalidData(format!("Export is not UTF-8: {}", e)))
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}

/// One importable row
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// 1-based line number in the source file (header is line 1)
    pub line: usize,
    pub branch: String,
    pub date: NaiveDate,
    pub raw: RawSalesInput,
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

/// Result of parsing an import file
#[derive(Debug, Clone, Default)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Parse a date in `YYYY-MM-DD` form
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidData(format!("Invalid date (expected YYYY-MM-DD): {}", s)))
}

/// Parse import CSV
///
/// Rows without a branch or with an unreadable date are skipped and
/// reported; numeric cells are never rejected.
pub fn parse_sales_csv<R: Read>(reader: R) -> Result<ParsedImport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let branch_col = column(&headers, &["branch"])
        .ok_or_else(|| Error::InvalidData("Missing 'branch' column".to_string()))?;
    let date_col = column(&headers, &["date"])
        .ok_or_else(|| Error::InvalidData("Missing 'date' column".to_string()))?;

    let mut parsed = ParsedImport::default();

    for (index, result) in rdr.records().enumerate() {
        let line = index + 2;
        let record = result?;

        let branch = record.get(branch_col).unwrap_or("").to_string();
        if branch.is_empty() {
            warn!(line, "Skipping row without branch");
            parsed.skipped.push(SkippedRow {
                line,
                reason: "missing branch".to_string(),
            });
            continue;
        }

        let date = match parse_date(record.get(date_col).unwrap_or("")) {
            Ok(date) => date,
            Err(e) => {
                warn!(line, error = %e, "Skipping row with bad date");
                parsed.skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let raw = RawSalesInput::from_fields(
            headers
                .iter()
                .zip(record.iter())
                .filter(|(h, _)| !is_identity_column(h)),
        );

        parsed.rows.push(ImportRow {
            line,
            branch,
            date,
            raw,
        });
    }

    Ok(parsed)
}

fn column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

fn is_identity_column(header: &str) -> bool {
    header.eq_ignore_ascii_case("branch") || header.eq_ignore_ascii_case("date")
}

/// Submit parsed rows through the ledger
///
/// Rows for unknown branches are skipped; store failures abort the run.
pub fn import_rows<S: RecordStore>(
    ledger: &SalesLedger<S>,
    parsed: ParsedImport,
) -> Result<ImportStats> {
    let mut stats = ImportStats {
        imported: 0,
        skipped: parsed.skipped,
    };

    for row in parsed.rows {
        match ledger.submit(&row.branch, row.date, &row.raw) {
            Ok(_) => stats.imported += 1,
            Err(Error::UnknownBranch(code)) => {
                warn!(line = row.line, branch = %code, "Skipping row for unknown branch");
                stats.skipped.push(SkippedRow {
                    line: row.line,
                    reason: format!("unknown branch: {}", code),
                });
            }
            Err(e) => return Err(e),
        }
    }

    stats.skipped.sort_by_key(|s| s.line);
    info!(
        imported = stats.imported,
        skipped = stats.skipped.len(),
        "Import complete"
    );
    Ok(stats)
}

/// Parse and import CSV in one step
pub fn import_sales_csv<S: RecordStore, R: Read>(
    ledger: &SalesLedger<S>,
    reader: R,
) -> Result<ImportStats> {
    let parsed = parse_sales_csv(reader)?;
    import_rows(ledger, parsed)
}
