//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute;
    use crate::store::RecordStore;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(branch: &str, day: NaiveDate, in_store: f64, target: f64) -> SalesRecord {
        let raw = RawSalesInput {
            target_sales: target,
            in_store_sales: in_store,
            grab_sales: 50.0,
            num_bills: 4.0,
            num_customers: 8.0,
            target_everest_per_bill: 100.0,
            ..Default::default()
        };
        compute(
            BranchCode::new(branch),
            day,
            &raw,
            Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 15).unwrap(),
        )
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.count_sales_records().unwrap(), 0);
        assert!(db.current_snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_in_memory_db_removes_files_on_drop() {
        let db = Database::in_memory().unwrap();
        db.upsert_sales_record(&record("ARI", date(2024, 3, 1), 100.0, 0.0))
            .unwrap();
        let dir = std::path::Path::new(db.path()).parent().unwrap().to_path_buf();
        assert!(dir.exists());

        let clone = db.clone();
        drop(db);
        assert!(dir.exists(), "clones keep the backing directory alive");
        assert_eq!(clone.count_sales_records().unwrap(), 1);

        drop(clone);
        assert!(!dir.exists());
    }

    #[test]
    fn test_is_encrypted_follows_open_mode() {
        let dir = tempfile::tempdir().unwrap();

        let plain = Database::new_unencrypted(dir.path().join("plain.db").to_str().unwrap()).unwrap();
        assert!(!plain.is_encrypted());
        assert!(!Database::in_memory().unwrap().is_encrypted());

        let keyed = Database::new_with_key(
            dir.path().join("keyed.db").to_str().unwrap(),
            Some("correct horse"),
        )
        .unwrap();
        assert!(keyed.is_encrypted());
    }

    #[test]
    fn test_sales_records_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('sales_records') WHERE name IN ('record_key', 'branch', 'date', 'total_sales', 'last_updated')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 5, "sales_records should have the key columns");
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.db");
        let path = path.to_str().unwrap();

        let db = Database::new_unencrypted(path).unwrap();
        db.upsert_sales_record(&record("ARI", date(2024, 3, 1), 100.0, 0.0))
            .unwrap();
        drop(db);

        let reopened = Database::new_unencrypted(path).unwrap();
        assert_eq!(reopened.count_sales_records().unwrap(), 1);
    }

    #[test]
    fn test_upsert_roundtrip_preserves_record() {
        let db = Database::in_memory().unwrap();
        let original = record("SILOM", date(2024, 3, 5), 1200.0, 1000.0);
        db.upsert_sales_record(&original).unwrap();

        let loaded = db
            .get_sales_record(&BranchCode::new("SILOM"), date(2024, 3, 5))
            .unwrap()
            .unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.total_sales(), 1250.0);
        assert_eq!(loaded.metrics().everest_per_bill, 312.5);
    }

    #[test]
    fn test_upsert_replaces_same_branch_and_date() {
        let db = Database::in_memory().unwrap();
        db.upsert_sales_record(&record("ARI", date(2024, 3, 1), 100.0, 0.0))
            .unwrap();
        db.upsert_sales_record(&record("ARI", date(2024, 3, 1), 900.0, 0.0))
            .unwrap();
        db.upsert_sales_record(&record("SILOM", date(2024, 3, 1), 10.0, 0.0))
            .unwrap();

        assert_eq!(db.count_sales_records().unwrap(), 2);
        let ari = db
            .get_sales_record(&BranchCode::new("ARI"), date(2024, 3, 1))
            .unwrap()
            .unwrap();
        assert_eq!(ari.raw().in_store_sales, 900.0);

        // Stored derived columns follow the latest raw values
        let conn = db.conn().unwrap();
        let stored_total: f64 = conn
            .query_row(
                "SELECT total_sales FROM sales_records WHERE record_key = 'ARI-2024-03-01'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored_total, 950.0);
    }

    #[test]
    fn test_list_filters_by_month_and_branch() {
        let db = Database::in_memory().unwrap();
        db.upsert_sales_record(&record("ARI", date(2024, 3, 20), 1.0, 0.0))
            .unwrap();
        db.upsert_sales_record(&record("ARI", date(2024, 3, 2), 2.0, 0.0))
            .unwrap();
        db.upsert_sales_record(&record("SILOM", date(2024, 3, 2), 3.0, 0.0))
            .unwrap();
        db.upsert_sales_record(&record("ARI", date(2024, 4, 1), 4.0, 0.0))
            .unwrap();
        db.upsert_sales_record(&record("ARI", date(2023, 12, 31), 5.0, 0.0))
            .unwrap();

        let all = db.list_sales_records(None).unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].date(), date(2023, 12, 31));

        let march = PeriodQuery::new(3, 2024, BranchFilter::All).unwrap();
        let listed = db.list_sales_records(Some(&march)).unwrap();
        let keys: Vec<String> = listed.iter().map(|r| r.key()).collect();
        assert_eq!(
            keys,
            vec!["ARI-2024-03-02", "SILOM-2024-03-02", "ARI-2024-03-20"]
        );

        let ari = PeriodQuery::new(3, 2024, BranchFilter::Branch(BranchCode::new("ARI"))).unwrap();
        assert_eq!(db.list_sales_records(Some(&ari)).unwrap().len(), 2);

        let december = PeriodQuery::new(12, 2023, BranchFilter::All).unwrap();
        assert_eq!(db.list_sales_records(Some(&december)).unwrap().len(), 1);
    }

    #[test]
    fn test_sql_listing_matches_in_memory_filter() {
        let db = Database::in_memory().unwrap();
        for (branch, day) in [("ARI", 1), ("ARI", 15), ("SILOM", 31)] {
            db.upsert_sales_record(&record(branch, date(2024, 1, day), day as f64, 0.0))
                .unwrap();
        }
        db.upsert_sales_record(&record("ARI", date(2024, 2, 1), 1.0, 0.0))
            .unwrap();

        let query = PeriodQuery::new(1, 2024, BranchFilter::All).unwrap();
        let from_sql = db.list_sales_records(Some(&query)).unwrap();
        let from_filter = crate::aggregate::filter_records(&db.current_snapshot().unwrap(), &query);
        assert_eq!(from_sql, from_filter);
    }

    #[test]
    fn test_delete_sales_record() {
        let db = Database::in_memory().unwrap();
        db.upsert_sales_record(&record("ARI", date(2024, 3, 1), 1.0, 0.0))
            .unwrap();

        assert!(db
            .delete_sales_record(&BranchCode::new("ARI"), date(2024, 3, 1))
            .unwrap());
        assert!(!db
            .delete_sales_record(&BranchCode::new("ARI"), date(2024, 3, 1))
            .unwrap());
        assert_eq!(db.count_sales_records().unwrap(), 0);
    }

    #[test]
    fn test_record_store_notifies_listeners() {
        let db = Database::in_memory().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let last_len = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        let len_clone = last_len.clone();
        db.on_snapshot_change(Box::new(move |snapshot| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            len_clone.store(snapshot.len(), Ordering::SeqCst);
        }));

        db.upsert(&record("ARI", date(2024, 3, 1), 1.0, 0.0)).unwrap();
        db.upsert(&record("ARI", date(2024, 3, 2), 1.0, 0.0)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(last_len.load(Ordering::SeqCst), 2);

        db.delete_sales_record(&BranchCode::new("ARI"), date(2024, 3, 2))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        // Cloned handles share listeners
        let clone = db.clone();
        clone
            .upsert(&record("SILOM", date(2024, 3, 2), 1.0, 0.0))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_record_store_get() {
        let db = Database::in_memory().unwrap();
        let stored = record("RAMA9", date(2024, 3, 9), 10.0, 0.0);
        db.upsert(&stored).unwrap();

        let found = RecordStore::get(&db, &BranchCode::new("rama9"), date(2024, 3, 9)).unwrap();
        assert_eq!(found, Some(stored));
        assert!(RecordStore::get(&db, &BranchCode::new("RAMA9"), date(2024, 3, 10))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_datetime_formats() {
        let rfc = parse_datetime("2024-03-01T18:30:15+00:00");
        assert_eq!(rfc, Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 15).unwrap());

        let sqlite = parse_datetime("2024-03-01 18:30:15");
        assert_eq!(sqlite, rfc);
    }

    #[test]
    fn test_derive_key_is_stable() {
        let a = derive_key("correct horse").unwrap();
        let b = derive_key("correct horse").unwrap();
        let c = derive_key("battery staple").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
