//! Derived daily metrics
//!
//! Turns a day's raw inputs into totals, differences against target, and
//! per-bill / per-head averages. Every ratio with a zero denominator is 0.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{BranchCode, RawSalesInput, SalesMetrics, SalesRecord};

/// `numerator / denominator`, or 0 when the denominator is exactly zero
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Difference as a percentage of target, 0 for a zero target
pub fn percent_of_target(difference: f64, target: f64) -> f64 {
    ratio(difference, target) * 100.0
}

/// Compute the derived block for a set of raw inputs
pub fn derive(raw: &RawSalesInput) -> SalesMetrics {
    let total_sales = raw.in_store_sales + raw.ta_sales + raw.grab_sales + raw.line_man_sales;
    let sales_difference = total_sales - raw.target_sales;

    let everest_per_bill = ratio(total_sales, raw.num_bills);
    let everest_per_bill_difference = everest_per_bill - raw.target_everest_per_bill;

    let everest_per_head = ratio(total_sales, raw.num_customers);
    let everest_per_head_difference = everest_per_head - raw.target_everest_per_head;

    SalesMetrics {
        total_sales,
        sales_difference,
        sales_percentage: percent_of_target(sales_difference, raw.target_sales),
        everest_per_bill,
        everest_per_bill_difference,
        everest_per_bill_percentage: percent_of_target(
            everest_per_bill_difference,
            raw.target_everest_per_bill,
        ),
        everest_per_head,
        everest_per_head_difference,
        everest_per_head_percentage: percent_of_target(
            everest_per_head_difference,
            raw.target_everest_per_head,
        ),
    }
}

/// Build a complete record for one branch and day
///
/// Non-finite inputs are treated as 0. Negative inputs are accepted.
/// `last_updated` is supplied by the caller; this function never reads
/// the clock.
pub fn compute(
    branch: BranchCode,
    date: NaiveDate,
    raw: &RawSalesInput,
    last_updated: DateTime<Utc>,
) -> SalesRecord {
    let raw = raw.sanitized();
    let metrics = derive(&raw);
    SalesRecord::from_parts(branch, date, raw, metrics, last_updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap()
    }

    fn raw() -> RawSalesInput {
        RawSalesInput {
            target_sales: 10000.0,
            in_store_sales: 6000.0,
            ta_sales: 1500.0,
            grab_sales: 2000.0,
            line_man_sales: 1500.0,
            num_bills: 50.0,
            num_customers: 80.0,
            target_everest_per_bill: 200.0,
            target_everest_per_head: 125.0,
        }
    }

    #[test]
    fn test_compute_full_record() {
        let record = compute(BranchCode::new("SILOM"), date(), &raw(), stamp());
        let m = record.metrics();

        assert_eq!(m.total_sales, 11000.0);
        assert_eq!(m.sales_difference, 1000.0);
        assert!((m.sales_percentage - 10.0).abs() < 1e-9);
        assert_eq!(m.everest_per_bill, 220.0);
        assert_eq!(m.everest_per_bill_difference, 20.0);
        assert!((m.everest_per_bill_percentage - 10.0).abs() < 1e-9);
        assert_eq!(m.everest_per_head, 137.5);
        assert_eq!(m.everest_per_head_difference, 12.5);
        assert!((m.everest_per_head_percentage - 10.0).abs() < 1e-9);
        assert_eq!(record.last_updated(), stamp());
        assert_eq!(record.key(), "SILOM-2024-03-01");
    }

    #[test]
    fn test_total_is_exact_channel_sum_with_negatives() {
        let input = RawSalesInput {
            in_store_sales: -250.0,
            ta_sales: 100.0,
            grab_sales: -50.5,
            line_man_sales: 10.25,
            ..Default::default()
        };
        let record = compute(BranchCode::new("ARI"), date(), &input, stamp());
        assert_eq!(record.total_sales(), -250.0 + 100.0 + -50.5 + 10.25);
    }

    #[test]
    fn test_zero_target_gives_zero_percentage() {
        let input = RawSalesInput {
            target_sales: 0.0,
            ..raw()
        };
        let record = compute(BranchCode::new("ARI"), date(), &input, stamp());
        assert_eq!(record.metrics().sales_difference, 11000.0);
        assert_eq!(record.metrics().sales_percentage, 0.0);
    }

    #[test]
    fn test_zero_bills_and_customers() {
        let input = RawSalesInput {
            num_bills: 0.0,
            num_customers: 0.0,
            target_everest_per_bill: 0.0,
            ..raw()
        };
        let record = compute(BranchCode::new("ARI"), date(), &input, stamp());
        let m = record.metrics();
        assert_eq!(m.everest_per_bill, 0.0);
        assert_eq!(m.everest_per_bill_percentage, 0.0);
        assert_eq!(m.everest_per_head, 0.0);
        // target EPH is still 125, so the difference is negative
        assert_eq!(m.everest_per_head_difference, -125.0);
        assert_eq!(m.everest_per_head_percentage, -100.0);
    }

    #[test]
    fn test_single_record_zero_bills_no_panic() {
        let input = RawSalesInput {
            in_store_sales: 500.0,
            num_bills: 0.0,
            ..Default::default()
        };
        let record = compute(BranchCode::new("RAMA9"), date(), &input, stamp());
        assert_eq!(record.metrics().everest_per_bill, 0.0);
        assert!(record.metrics().everest_per_bill.is_finite());
    }

    #[test]
    fn test_all_defaults_are_zero() {
        let record = compute(
            BranchCode::new("ARI"),
            date(),
            &RawSalesInput::default(),
            stamp(),
        );
        assert_eq!(*record.metrics(), SalesMetrics::default());
    }

    #[test]
    fn test_non_finite_inputs_coerced() {
        let input = RawSalesInput {
            in_store_sales: f64::NAN,
            grab_sales: f64::INFINITY,
            ta_sales: 100.0,
            ..Default::default()
        };
        let record = compute(BranchCode::new("ARI"), date(), &input, stamp());
        assert_eq!(record.raw().in_store_sales, 0.0);
        assert_eq!(record.raw().grab_sales, 0.0);
        assert_eq!(record.total_sales(), 100.0);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let a = compute(BranchCode::new("ARI"), date(), &raw(), stamp());
        let b = compute(BranchCode::new("ARI"), date(), &raw(), stamp());
        assert_eq!(a, b);
    }
}
