//! In-memory state stores for testing.
//!
//! `MemoryStateStore` behaves like an always-available table; the orchestrator
//! tests use it to observe fingerprint reads and writes. `FailingStateStore`
//! simulates a store the caller has no access to.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, StepError};
use crate::store::{FingerprintRecord, StateStore};

/// An in-memory state store keyed by (table, record id).
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    records: Mutex<HashMap<(String, String), FingerprintRecord>>,
    ensures: AtomicUsize,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one record.
    pub fn with_record(table: impl Into<String>, record: FingerprintRecord) -> Self {
        let store = Self::new();
        store
            .records
            .lock()
            .unwrap()
            .insert((table.into(), record.record_id.clone()), record);
        store
    }

    /// Number of `ensure_table` calls received.
    pub fn ensure_count(&self) -> usize {
        self.ensures.load(Ordering::SeqCst)
    }

    /// Number of `get` calls received.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `put` calls received.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Returns the stored record for the identity, if any.
    pub fn record(&self, table: &str, record_id: &str) -> Option<FingerprintRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(table.to_string(), record_id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn ensure_table(&self, _table: &str) -> Result<()> {
        self.ensures.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, table: &str, record_id: &str) -> Result<Option<FingerprintRecord>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.record(table, record_id))
    }

    async fn put(&self, table: &str, record: &FingerprintRecord) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert((table.to_string(), record.record_id.clone()), record.clone());
        Ok(())
    }
}

/// A state store whose every operation fails with an access error.
#[derive(Debug, Clone, Default)]
pub struct FailingStateStore;

impl FailingStateStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StateStore for FailingStateStore {
    async fn ensure_table(&self, table: &str) -> Result<()> {
        Err(StepError::store_access(format!(
            "access denied to table {table}"
        )))
    }

    async fn get(&self, table: &str, _record_id: &str) -> Result<Option<FingerprintRecord>> {
        Err(StepError::store_access(format!(
            "access denied to table {table}"
        )))
    }

    async fn put(&self, table: &str, _record: &FingerprintRecord) -> Result<()> {
        Err(StepError::store_access(format!(
            "access denied to table {table}"
        )))
    }
}
