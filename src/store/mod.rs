//! Durable key -> JSON store seam.
//!
//! The persistence substrate is a single-process, single-writer local store:
//! synchronous get/set, last-write-wins, no transactions or isolation. Typed
//! shape validation (and the reset-on-corruption policy) lives in the cache
//! layer; this seam moves opaque JSON values only.

use std::fmt;
use thiserror::Error;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Synchronous durable key -> JSON value store.
pub trait Store: Send + Sync + fmt::Debug {
    /// Read the value under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;

    /// Remove `key` entirely.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Error type for durable store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(String),
    #[error("store document corrupt: {0}")]
    Corrupt(String),
}

/// Keys the cache layer persists under.
pub mod keys {
    /// Coverage set: list of merged closed intervals.
    pub const COVERAGE: &str = "coverage_intervals";
    /// Log store: id -> event map plus ascending index.
    pub const LOGS: &str = "logs_cache";
    /// Manual overrides: event id -> buy price.
    pub const MANUAL: &str = "manual_buys";
    /// Resumable crawl cursor.
    pub const CURSOR: &str = "crawl_cursor";
}
