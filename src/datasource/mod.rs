//! Remote log source abstraction.

use crate::domain::{Event, TimeSec};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod http;
pub mod mock;
pub mod rate;

pub use http::HttpLogSource;
pub use mock::MockLogSource;
pub use rate::{BackoffPolicy, RateGate};

/// One page of the remote log.
#[derive(Debug, Clone)]
pub struct Page {
    /// Events in the page, sorted descending by timestamp.
    pub events: Vec<Event>,
    /// HTTP status the page arrived with.
    pub http_status: u16,
}

/// Read-only paginated query against the remote event log.
///
/// The crawler calls `fetch_page` with a strictly decreasing `to` cursor per
/// page. Implementations detect throttling (HTTP status or in-payload error
/// code) and surface it as `SourceError::Throttled`; retry policy belongs to
/// the caller.
#[async_trait]
pub trait LogSource: Send + Sync + fmt::Debug {
    /// Fetch events with `from <= timestamp <= to` (the remote may return
    /// only the newest slice of that range; older records need further
    /// pages with a lower `to`).
    async fn fetch_page(&self, from: TimeSec, to: TimeSec) -> Result<Page, SourceError>;
}

/// Error type for remote log operations.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Connection-level failure (timeout, DNS, reset).
    #[error("network error: {0}")]
    Network(String),
    /// Non-throttling HTTP failure.
    #[error("HTTP error {status}")]
    Http { status: u16 },
    /// Throttling response, by HTTP status or payload error code. Retryable.
    #[error("rate limited")]
    Throttled,
    /// Application-level error payload from the remote log. Aborts a crawl.
    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },
    /// Response body did not parse as the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl SourceError {
    /// True for errors the crawler retries with backoff instead of aborting.
    pub fn is_throttle(&self) -> bool {
        matches!(self, SourceError::Throttled)
    }
}
