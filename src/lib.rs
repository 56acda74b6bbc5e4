pub mod api;
pub mod cache;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use cache::{Cache, CoverageSet, CrawlCursor, LogStore, ManualOverrides};
pub use config::{Config, ContextDepth};
pub use datasource::{
    BackoffPolicy, HttpLogSource, LogSource, MockLogSource, Page, RateGate, SourceError,
};
pub use domain::{Event, InstrumentId, Kind, LedgerRow, LogId, TimeSec, WindowSummary};
pub use error::AppError;
pub use orchestration::{CrawlError, CrawlOutcome, Crawler, WindowReport, WindowService};
pub use store::{JsonFileStore, MemoryStore, Store, StoreError};
