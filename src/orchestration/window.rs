//! Window queries: missing-range detection, crawling, and ledger replay.

use crate::cache::{Cache, CrawlCursor};
use crate::config::ContextDepth;
use crate::domain::{LedgerRow, TimeSec, WindowSummary};
use crate::engine;
use crate::orchestration::crawler::{CrawlError, Crawler};
use crate::store::StoreError;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// The single consumer-facing query surface.
///
/// All crawling and replay runs on one cooperative timeline: a busy flag
/// rejects a second window query while one is in flight, since the durable
/// store has no isolation and two writers would race on the log store and
/// coverage keys. In-flight network waits cannot be forcibly aborted; the
/// only bound on a call is the crawler's page/event budget.
#[derive(Debug)]
pub struct WindowService {
    cache: Cache,
    crawler: Crawler,
    context_depth: ContextDepth,
    busy: Mutex<()>,
}

/// Outcome of a window query.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowReport {
    pub rows: Vec<LedgerRow>,
    pub summary: WindowSummary,
    /// Events newly added to the log store by this call.
    pub fetched: usize,
    /// Pages fetched by this call.
    pub pages: usize,
    /// True when a budget stop left a resume cursor: the window is served
    /// from what is cached so far and a later call will continue the crawl.
    pub partial: bool,
    /// Throttling retries performed, surfaced for observability.
    pub throttle_retries: u32,
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("a pull is already in flight")]
    Busy,
    #[error("invalid window: from {from} > to {to}")]
    InvalidWindow { from: i64, to: i64 },
    #[error(transparent)]
    Crawl(#[from] CrawlError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WindowService {
    pub fn new(cache: Cache, crawler: Crawler, context_depth: ContextDepth) -> Self {
        Self {
            cache,
            crawler,
            context_depth,
            busy: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Answer "what happened in `[from, to]`": fill coverage gaps from the
    /// remote log, then replay the cached history into ledger rows.
    pub async fn get_window(
        &self,
        from: TimeSec,
        to: TimeSec,
    ) -> Result<WindowReport, WindowError> {
        let _guard = self.busy.try_lock().map_err(|_| WindowError::Busy)?;

        if from > to {
            return Err(WindowError::InvalidWindow {
                from: from.as_i64(),
                to: to.as_i64(),
            });
        }

        let coverage = self.cache.load_coverage()?;
        let gaps = coverage.missing(from.as_i64(), to.as_i64());
        debug!(gaps = gaps.len(), "window coverage gaps");

        let mut fetched = 0;
        let mut pages = 0;
        let mut throttle_retries = 0;
        let mut partial = false;

        for gap in gaps {
            let gap_from = TimeSec::new(gap.start);
            let gap_to = TimeSec::new(gap.end);

            // A persisted cursor resumes only the exact same logical request;
            // any other gap starts fresh from its own upper bound.
            let resume = self
                .cache
                .load_cursor()?
                .filter(|c| c.from == gap_from && c.to == gap_to)
                .and_then(|c| c.cursor_to);

            let outcome = match self.crawler.crawl(gap_from, gap_to, resume).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    // Partial results are never discarded: store what was
                    // fetched (without claiming coverage) before failing.
                    self.cache.merge_events(&err.partial().events)?;
                    return Err(err.into());
                }
            };

            // Log store first, coverage second: coverage must never claim
            // events the store does not hold yet.
            fetched += self.cache.merge_events(&outcome.events)?;
            pages += outcome.pages;
            throttle_retries += outcome.throttle_retries;

            match outcome.next_cursor_to {
                None => {
                    self.cache.extend_coverage(gap.start, gap.end)?;
                    self.cache.clear_cursor()?;
                }
                Some(cursor_to) => {
                    self.cache.save_cursor(&CrawlCursor {
                        from: gap_from,
                        to: gap_to,
                        cursor_to: Some(cursor_to),
                    })?;
                    partial = true;
                    // The call's budget is spent; later gaps wait for the
                    // next pull.
                    break;
                }
            }
        }

        let logs = self.cache.load_logs()?;
        let overrides = self.cache.load_overrides()?;
        let context = match self.context_depth {
            ContextDepth::All => logs.events_before(from),
            ContextDepth::None => Vec::new(),
        };
        let window_events = logs.events_in(from, to);
        let rows = engine::replay(&context, &window_events, &overrides);
        let summary = WindowSummary::from_rows(&rows);

        info!(
            rows = rows.len(),
            fetched, pages, partial, "window query complete"
        );

        Ok(WindowReport {
            rows,
            summary,
            fetched,
            pages,
            partial,
            throttle_retries,
        })
    }
}
