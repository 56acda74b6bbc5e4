//! File-backed store: one JSON document holding all keys, written through
//! atomically (write to a sibling temp file, then rename).

use super::{Store, StoreError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, serde_json::Value>>,
}

impl JsonFileStore {
    /// Open (or create) the store document at `path`.
    ///
    /// # Errors
    /// Fails if the file exists but cannot be read or is not a JSON object;
    /// a wholly unreadable document is fatal rather than silently discarded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let doc: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?;
                match doc {
                    serde_json::Value::Object(map) => map.into_iter().collect(),
                    other => {
                        return Err(StoreError::Corrupt(format!(
                            "{}: expected object, got {}",
                            path.display(),
                            other
                        )))
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        debug!(path = %path.display(), keys = values.len(), "opened store");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn flush(&self, values: &HashMap<String, serde_json::Value>) -> Result<(), StoreError> {
        let doc = serde_json::Value::Object(
            values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        let text = serde_json::to_string(&doc).map_err(|e| StoreError::Io(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, text).map_err(|e| StoreError::Io(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

impl Store for JsonFileStore {
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
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        values.remove(key);
        self.flush(&values)
    }
}
