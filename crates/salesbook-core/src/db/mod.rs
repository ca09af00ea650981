//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `records` - Daily sales record upsert, listing and deletion

use std::sync::Arc;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};
use crate::store::SnapshotListeners;

mod records;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "SALESBOOK_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"salesbook-salt-1";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a stored timestamp into a DateTime<Utc>
///
/// Accepts RFC 3339 (how `last_updated` is written) and SQLite's
/// `CURRENT_TIMESTAMP` format.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    encrypted: bool,
    listeners: SnapshotListeners,
    /// Backing directory for `in_memory()`, removed with the last clone
    temp_dir: Option<Arc<tempfile::TempDir>>,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `SALESBOOK_DB_KEY` environment variable to be set.
    /// The database will be encrypted using SQLCipher with a key derived
    /// from the passphrase via Argon2.
    ///
    /// Returns an error if `SALESBOOK_DB_KEY` is not set. Use `new_unencrypted()`
    /// for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        let encryption_key = std::env::var(DB_KEY_ENV).ok();
        match encryption_key {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    ///
    /// WARNING: This creates an unencrypted database. Only use for development
    /// or testing.
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Key must be set on every new connection
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
            encrypted: passphrase.is_some(),
            listeners: SnapshotListeners::new(),
            temp_dir: None,
        };
        db.run_migrations()?;

        info!(path = %path, encrypted = passphrase.is_some(), "Opened sales database");
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a file in a temporary directory rather than `:memory:`
    /// because SQLCipher has issues with in-memory databases in the
    /// connection pool. The directory is deleted when the last clone drops.
    pub fn in_memory() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("salesbook_test_")
            .tempdir()?;
        let path = dir.path().join("sales.db");

        let mut db = Self::new_unencrypted(&path.to_string_lossy())?;
        db.temp_dir = Some(Arc::new(dir));
        Ok(db)
    }

    /// Whether the database was opened with an encryption key
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    pub(crate) fn listeners(&self) -> &SnapshotListeners {
        &self.listeners
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Daily sales, one row per branch and day
            -- Derived columns are written alongside the raw inputs for ad-hoc SQL;
            -- records are always rebuilt from the raw columns when read.
            CREATE TABLE IF NOT EXISTS sales_records (
                id INTEGER PRIMARY KEY,
                record_key TEXT NOT NULL UNIQUE,           -- BRANCH-YYYY-MM-DD
                branch TEXT NOT NULL,
                date DATE NOT NULL,
                target_sales REAL NOT NULL DEFAULT 0,
                in_store_sales REAL NOT NULL DEFAULT 0,
                ta_sales REAL NOT NULL DEFAULT 0,
                grab_sales REAL NOT NULL DEFAULT 0,
                line_man_sales REAL NOT NULL DEFAULT 0,
                num_bills REAL NOT NULL DEFAULT 0,
                num_customers REAL NOT NULL DEFAULT 0,
                target_everest_per_bill REAL NOT NULL DEFAULT 0,
                target_everest_per_head REAL NOT NULL DEFAULT 0,
                total_sales REAL NOT NULL DEFAULT 0,
                sales_difference REAL NOT NULL DEFAULT 0,
                sales_percentage REAL NOT NULL DEFAULT 0,
                everest_per_bill REAL NOT NULL DEFAULT 0,
                everest_per_bill_difference REAL NOT NULL DEFAULT 0,
                everest_per_bill_percentage REAL NOT NULL DEFAULT 0,
                everest_per_head REAL NOT NULL DEFAULT 0,
                everest_per_head_difference REAL NOT NULL DEFAULT 0,
                everest_per_head_percentage REAL NOT NULL DEFAULT 0,
                last_updated TEXT NOT NULL,                -- RFC 3339
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(branch, date)
            );

            CREATE INDEX IF NOT EXISTS idx_sales_records_date ON sales_records(date);
            CREATE INDEX IF NOT EXISTS idx_sales_records_branch ON sales_records(branch);
            "#,
        )?;

        Ok(())
    }
}

mod tests;
