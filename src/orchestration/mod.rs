//! Crawl and window-query orchestration.

pub mod crawler;
pub mod window;

pub use crawler::{CrawlError, CrawlOutcome, Crawler};
pub use window::{WindowError, WindowReport, WindowService};
