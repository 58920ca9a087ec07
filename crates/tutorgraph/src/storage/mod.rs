//! Key-value persistence for the relationship graph.
//!
//! The [`RelationshipStore`](crate::social::RelationshipStore) keeps its adjacency
//! indexes in memory and writes every committed transaction through a
//! [`StorageBackend`] as a single atomic batch. Two backends are provided:
//! - [`RocksDBBackend`]: durable storage (behind the `rocksdb-backend` feature)
//! - [`MemoryBackend`]: volatile storage for tests and ephemeral graphs

mod memory;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb_backend;

pub use memory::MemoryBackend;
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb_backend::RocksDBBackend;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Key-value pair returned by prefix scans.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Storage interface consumed by the relationship store.
///
/// Implementations must apply a batch atomically: either every operation lands
/// or none does.
pub trait StorageBackend: Send + Sync {
    /// Return every key-value pair whose key starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Storage`](crate::GraphError::Storage) if iteration fails.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>>;

    /// Execute a batch of write operations atomically.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Storage`](crate::GraphError::Storage) if the batch
    /// cannot be written. Nothing from the batch is visible afterwards.
    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> Result<()>;

    /// Flush buffered writes to durable media. No automatic flushing happens.
    fn flush(&mut self) -> Result<()>;
}

/// Batch write operation for atomic updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOperation {
    /// Put a key-value pair
    Put {
        /// Key to write
        key: Vec<u8>,
        /// Value to write
        value: Vec<u8>,
    },
    /// Delete a key
    Delete {
        /// Key to delete
        key: Vec<u8>,
    },
}
