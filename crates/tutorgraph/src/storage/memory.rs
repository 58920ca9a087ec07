//! In-memory storage backend.
//!
//! All data is lost when the backend is dropped.

use super::{BatchOperation, KeyValue, StorageBackend};
use crate::error::{GraphError, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// In-memory storage backend using a `BTreeMap`.
///
/// Cloning the backend shares the underlying map, so a test can keep a handle
/// and inspect what a [`RelationshipStore`](crate::social::RelationshipStore) wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of key-value pairs stored.
    pub fn len(&self) -> usize {
        self.data.read().map(|data| data.len()).unwrap_or(0)
    }

    /// Check if the backend is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryBackend {
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>> {
        let data = self
            .data
            .read()
            .map_err(|_| GraphError::poisoned("memory backend"))?;
        let results: Vec<KeyValue> = data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }

    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| GraphError::poisoned("memory backend"))?;
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
