pub mod memory_adapter;

pub use memory_adapter::{StorageAdapter, StoredValue, ValueType};

use crate::error::Result;

/// The `KV store` collaborator interface (spec §6): the typed per-key
/// operations the command layer drives live as inherent methods on
/// [`StorageAdapter`] itself; this trait is the narrower surface the RDB
/// Codec and the Replication Controller's command-application helper need
/// and depend on, so they never couple to a concrete storage backend.
pub trait KvStore: Send + Sync {
    /// Number of logical databases (Redis-style `SELECT 0..n`).
    fn db_count(&self) -> usize;

    /// Every non-expired `(key, value)` pair in `db_index`, in whatever
    /// order the backend iterates natively.
    fn snapshot_entries(&self, db_index: usize) -> Result<Vec<(String, StoredValue)>>;

    /// Apply a decoded `(key, value)` pair, overwriting any existing entry.
    fn restore_entry(&self, db_index: usize, key: String, value: StoredValue) -> Result<()>;
}

impl KvStore for StorageAdapter {
    fn db_count(&self) -> usize {
        StorageAdapter::db_count(self)
    }

    fn snapshot_entries(&self, db_index: usize) -> Result<Vec<(String, StoredValue)>> {
        StorageAdapter::snapshot_entries(self, db_index)
    }

    fn restore_entry(&self, db_index: usize, key: String, value: StoredValue) -> Result<()> {
        StorageAdapter::restore_entry(self, db_index, key, value)
    }
}

/// The storage engine used by the server: an in-memory, multi-database
/// keyspace with per-type values and TTLs. Disk persistence (RDB/AOF) is a
/// separate layer (`crate::rdb`, `crate::persistence`) that reads and writes
/// through this engine rather than being part of it.
pub type StorageEngine = StorageAdapter;
