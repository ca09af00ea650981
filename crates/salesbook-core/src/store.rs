//! Record store abstraction
//!
//! The core sees persistence as a keyed, upsertable collection of daily
//! records: a snapshot on demand plus a callback whenever the snapshot
//! changes. `MemoryStore` keeps everything in process; [`crate::Database`]
//! persists to SQLite.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{record_key, BranchCode, SalesRecord};
use chrono::NaiveDate;

/// Callback invoked with the full snapshot after each successful write
pub type SnapshotHandler = Box<dyn Fn(&[SalesRecord]) + Send + Sync>;

/// Keyed collection of daily records
pub trait RecordStore: Send + Sync {
    /// Insert or replace the record for its `(branch, date)` key
    fn upsert(&self, record: &SalesRecord) -> Result<()>;

    /// All records currently held, in no particular order
    fn current_snapshot(&self) -> Result<Vec<SalesRecord>>;

    /// Register a handler for snapshot changes
    fn on_snapshot_change(&self, handler: SnapshotHandler);

    /// Look up one record by branch and date
    fn get(&self, branch: &BranchCode, date: NaiveDate) -> Result<Option<SalesRecord>> {
        let key = record_key(branch, date);
        Ok(self
            .current_snapshot()?
            .into_iter()
            .find(|r| r.key() == key))
    }
}

/// Registered snapshot handlers, shared by store implementations
#[derive(Clone, Default)]
pub struct SnapshotListeners {
    handlers: Arc<Mutex<Vec<SnapshotHandler>>>,
}

impl SnapshotListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handler: SnapshotHandler) {
        match self.handlers.lock() {
            Ok(mut handlers) => handlers.push(handler),
            Err(poisoned) => poisoned.into_inner().push(handler),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every handler with the snapshot
    pub fn notify(&self, snapshot: &[SalesRecord]) {
        let handlers = match self.handlers.lock() {
            Ok(handlers) => handlers,
            Err(poisoned) => {
                warn!("Snapshot listener lock poisoned, continuing");
                poisoned.into_inner()
            }
        };
        debug!(
            listeners = handlers.len(),
            records = snapshot.len(),
            "Notifying snapshot listeners"
        );
        for handler in handlers.iter() {
            handler(snapshot);
        }
    }
}

/// In-process record store
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<String, SalesRecord>>>,
    listeners: SnapshotListeners,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with records (later duplicates win)
    pub fn with_records(records: impl IntoIterator<Item = SalesRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.key(), r)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
            listeners: SnapshotListeners::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> Error {
        Error::Store("Record store lock poisoned".to_string())
    }
}

impl RecordStore for MemoryStore {
    fn upsert(&self, record: &SalesRecord) -> Result<()> {
        let snapshot: Vec<SalesRecord> = {
            let mut records = self.records.write().map_err(|_| Self::poisoned())?;
            records.insert(record.key(), record.clone());
            records.values().cloned().collect()
        };
        debug!(key = %record.key(), "Upserted record in memory store");
        self.listeners.notify(&snapshot);
        Ok(())
    }

    fn current_snapshot(&self) -> Result<Vec<SalesRecord>> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.values().cloned().collect())
    }

    fn on_snapshot_change(&self, handler: SnapshotHandler) {
        self.listeners.add(handler);
    }

    fn get(&self, branch: &BranchCode, date: NaiveDate) -> Result<Option<SalesRecord>> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.get(&record_key(branch, date)).cloned())
    }
}
