//! In-memory store for tests and ephemeral runs.

use super::{Store, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Volatile `Store` backed by a mutexed map.
///
/// Each instance is independent, so tests never interfere with one another.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        values.remove(key);
        Ok(())
    }
}
