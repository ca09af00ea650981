//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, branches) and shared utilities (open_db, open_ledger)
//! - `import` - CSV import and export
//! - `records` - Submitting, listing, showing and deleting daily records
//! - `reports` - Monthly summary and trend reports
//! - `serve` - Web server command

pub mod core;
pub mod import;
pub mod records;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use self::core::*;
pub use import::*;
pub use records::*;
pub use reports::*;
pub use serve::*;

/// Format an amount with thousands separators and two decimals
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}

/// Format a percentage with an explicit sign
pub fn format_percent(value: f64) -> String {
    format!("{:+.2}%", value)
}
