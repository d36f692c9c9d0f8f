//! State store layer for athena-step.
//!
//! Tracks one fingerprint record per (table, record id) identity so that a
//! rerun with unchanged SQL can be skipped. The production implementation is
//! DynamoDB; a trait seam allows in-memory stores in tests.

mod dynamo;
mod mock;

pub use dynamo::DynamoStateStore;
pub use mock::{FailingStateStore, MemoryStateStore};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identity under which fingerprint state for a logical query is kept.
///
/// Presence is always explicit: the orchestrator carries
/// `Option<TrackingKey>`, never a standalone "tracking enabled" flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingKey {
    /// DynamoDB table holding the fingerprint records.
    pub table: String,
    /// Primary key of this query's record within the table.
    pub record_id: String,
}

/// Persisted fingerprint state, one record per tracked identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    /// The table's `id` primary key.
    pub record_id: String,
    /// Digest of the most recently successfully executed query text.
    pub hash: String,
    /// Epoch seconds of the last successful write.
    pub timestamp: i64,
}

/// Trait defining the interface for fingerprint state stores.
///
/// `get` treats absence as a normal outcome; only real store failures are
/// errors. `put` is an unconditional upsert with last-write-wins semantics,
/// so concurrent invocations racing on one identity resolve to the last
/// successful writer (documented, not prevented).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Ensures the named table exists and is ready for reads and writes,
    /// creating it if missing. Any failure other than "not found" during
    /// the existence check is fatal and must not trigger creation.
    async fn ensure_table(&self, table: &str) -> Result<()>;

    /// Point lookup of the record for `record_id`, or `None` if absent.
    async fn get(&self, table: &str, record_id: &str) -> Result<Option<FingerprintRecord>>;

    /// Upserts the record, overwriting any previous one for its id.
    async fn put(&self, table: &str, record: &FingerprintRecord) -> Result<()>;
}
