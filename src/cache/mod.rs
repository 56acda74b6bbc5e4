//! Persistent cache facade: coverage set, log store, manual overrides, and
//! the resumable crawl cursor, all layered on the durable key -> JSON store.
//!
//! Every mutation loads the typed value, changes it, and writes it back.
//! There is no atomicity across keys, so callers must write the log store
//! before extending coverage: coverage must never claim data the log store
//! does not yet contain.

use crate::domain::{Event, LogId, TimeSec};
use crate::store::{keys, Store, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub mod coverage;
pub mod logstore;
pub mod overrides;

pub use coverage::CoverageSet;
pub use logstore::LogStore;
pub use overrides::{ManualOverride, ManualOverrides};

/// State of an in-progress backward crawl for one `[from, to]` request.
///
/// `cursor_to = None` means the crawl reached `from`; the cursor is then
/// cleared rather than persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlCursor {
    pub from: TimeSec,
    pub to: TimeSec,
    pub cursor_to: Option<TimeSec>,
}

#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<dyn Store>,
    log_cap: usize,
}

impl Cache {
    pub fn new(store: Arc<dyn Store>, log_cap: usize) -> Self {
        Self { store, log_cap }
    }

    /// Load a typed value under `key`. An absent key or a value that no
    /// longer parses as the expected shape both yield the default: local
    /// corruption degrades to an empty cache, never a failed call.
    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        match self.store.get(key)? {
            None => Ok(T::default()),
            Some(value) => match serde_json::from_value(value) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!(key, error = %e, "persisted value corrupt, resetting to empty");
                    Ok(T::default())
                }
            },
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value)
            .map_err(|e| StoreError::Io(format!("serialize {}: {}", key, e)))?;
        self.store.set(key, json)
    }

    pub fn load_coverage(&self) -> Result<CoverageSet, StoreError> {
        self.load_or_default(keys::COVERAGE)
    }

    pub fn save_coverage(&self, coverage: &CoverageSet) -> Result<(), StoreError> {
        self.save(keys::COVERAGE, coverage)
    }

    pub fn load_logs(&self) -> Result<LogStore, StoreError> {
        self.load_or_default(keys::LOGS)
    }

    pub fn save_logs(&self, logs: &LogStore) -> Result<(), StoreError> {
        self.save(keys::LOGS, logs)
    }

    pub fn load_overrides(&self) -> Result<ManualOverrides, StoreError> {
        self.load_or_default(keys::MANUAL)
    }

    pub fn save_overrides(&self, overrides: &ManualOverrides) -> Result<(), StoreError> {
        self.save(keys::MANUAL, overrides)
    }

    pub fn load_cursor(&self) -> Result<Option<CrawlCursor>, StoreError> {
        match self.store.get(keys::CURSOR)? {
            None => Ok(None),
            Some(value) => match serde_json::from_value(value) {
                Ok(cursor) => Ok(Some(cursor)),
                Err(e) => {
                    warn!(error = %e, "crawl cursor corrupt, discarding");
                    Ok(None)
                }
            },
        }
    }

    pub fn save_cursor(&self, cursor: &CrawlCursor) -> Result<(), StoreError> {
        self.save(keys::CURSOR, cursor)
    }

    pub fn clear_cursor(&self) -> Result<(), StoreError> {
        self.store.remove(keys::CURSOR)
    }

    /// Merge fetched events into the log store, applying the soft cap, and
    /// persist. Returns how many events were new.
    pub fn merge_events(&self, events: &[Event]) -> Result<usize, StoreError> {
        if events.is_empty() {
            return Ok(0);
        }
        let mut logs = self.load_logs()?;
        let added = logs.insert_batch(events);
        let evicted = logs.evict_to_cap(self.log_cap);
        if !evicted.is_empty() {
            warn!(evicted = evicted.len(), cap = self.log_cap, "log store cap reached");
        }
        self.save_logs(&logs)?;
        Ok(added)
    }

    /// Mark `[a, b]` as fully fetched. Call only after the corresponding
    /// events have been written to the log store.
    pub fn extend_coverage(&self, a: i64, b: i64) -> Result<(), StoreError> {
        let mut coverage = self.load_coverage()?;
        coverage.extend(a, b);
        self.save_coverage(&coverage)
    }

    pub fn set_override(&self, id: &LogId, buy_price: f64) -> Result<(), StoreError> {
        let mut overrides = self.load_overrides()?;
        overrides.set(id, buy_price, TimeSec::now());
        self.save_overrides(&overrides)
    }

    pub fn clear_override(&self, id: &LogId) -> Result<bool, StoreError> {
        let mut overrides = self.load_overrides()?;
        let existed = overrides.clear(id);
        self.save_overrides(&overrides)?;
        Ok(existed)
    }

    pub fn clear_all_overrides(&self) -> Result<(), StoreError> {
        self.save_overrides(&ManualOverrides::new())
    }

    /// Destructive: drop all cached logs, coverage, and any resume cursor.
    /// Overrides survive; they are cleared separately.
    pub fn clear_logs_and_coverage(&self) -> Result<(), StoreError> {
        self.save_logs(&LogStore::new())?;
        self.save_coverage(&CoverageSet::new())?;
        self.clear_cursor()
    }
}
