//! Backward paginated crawl of the remote log.
//!
//! Pages walk from a `to` cursor down toward `from`; each page's oldest
//! timestamp minus one becomes the next cursor. A crawl stops on an empty
//! page, on reaching `from`, or on a page/event budget, in which case the
//! last cursor is reported so a later call can resume the same `[from, to]`
//! request without re-walking pages it has already seen.

use crate::datasource::{BackoffPolicy, LogSource, Page, RateGate, SourceError};
use crate::domain::{Event, TimeSec};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Crawler {
    source: Arc<dyn LogSource>,
    gate: Arc<RateGate>,
    backoff: BackoffPolicy,
    page_budget: usize,
    event_budget: usize,
    courtesy_pause: Duration,
}

/// Result of one crawl call.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Everything fetched this call, in page order (newest pages first).
    pub events: Vec<Event>,
    /// `Some(cursor)` when a budget stopped the crawl early; `None` when the
    /// requested `from` boundary was reached and the window is complete.
    pub next_cursor_to: Option<TimeSec>,
    /// Pages fetched.
    pub pages: usize,
    /// Throttling retries performed across all pages of this call.
    pub throttle_retries: u32,
}

impl CrawlOutcome {
    /// True when the crawl covered the whole requested range.
    pub fn complete(&self) -> bool {
        self.next_cursor_to.is_none()
    }
}

/// Crawl failures. Both variants keep the events fetched before the failure:
/// partial results are never discarded.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("crawl aborted: {error}")]
    Aborted {
        error: SourceError,
        partial: CrawlOutcome,
    },
    #[error("throttle retries exhausted after {attempts} attempts")]
    ThrottleExhausted {
        attempts: u32,
        partial: CrawlOutcome,
    },
}

impl CrawlError {
    /// The partial outcome preserved from before the failure.
    pub fn partial(&self) -> &CrawlOutcome {
        match self {
            CrawlError::Aborted { partial, .. } => partial,
            CrawlError::ThrottleExhausted { partial, .. } => partial,
        }
    }
}

impl Crawler {
    pub fn new(
        source: Arc<dyn LogSource>,
        gate: Arc<RateGate>,
        backoff: BackoffPolicy,
        page_budget: usize,
        event_budget: usize,
        courtesy_pause: Duration,
    ) -> Self {
        Self {
            source,
            gate,
            backoff,
            page_budget,
            event_budget,
            courtesy_pause,
        }
    }

    /// Crawl `[from, to]` backward, starting at `resume_to` when resuming a
    /// previously paused crawl of the same request.
    pub async fn crawl(
        &self,
        from: TimeSec,
        to: TimeSec,
        resume_to: Option<TimeSec>,
    ) -> Result<CrawlOutcome, CrawlError> {
        let mut cursor_to = resume_to.unwrap_or(to);
        let mut outcome = CrawlOutcome::default();

        loop {
            if outcome.pages >= self.page_budget || outcome.events.len() >= self.event_budget {
                info!(
                    pages = outcome.pages,
                    events = outcome.events.len(),
                    cursor = cursor_to.as_i64(),
                    "crawl paused at budget"
                );
                outcome.next_cursor_to = Some(cursor_to);
                return Ok(outcome);
            }

            let page = match self
                .fetch_page_gated(from, cursor_to, &mut outcome.throttle_retries)
                .await
            {
                Ok(page) => page,
                Err(PageFailure::Fatal(error)) => {
                    return Err(CrawlError::Aborted {
                        error,
                        partial: outcome,
                    })
                }
                Err(PageFailure::ThrottleExhausted(attempts)) => {
                    return Err(CrawlError::ThrottleExhausted {
                        attempts,
                        partial: outcome,
                    })
                }
            };

            // An empty page means nothing older remains in range.
            let Some(oldest) = page.events.last().map(|e| e.timestamp) else {
                return Ok(outcome);
            };

            outcome.pages += 1;
            outcome.events.extend(page.events);

            if oldest <= from {
                debug!(oldest = oldest.as_i64(), "crawl reached requested from");
                return Ok(outcome);
            }
            cursor_to = TimeSec::new(oldest.as_i64() - 1);

            // Courtesy pause between pages, separate from throttling backoff.
            if !self.courtesy_pause.is_zero() {
                tokio::time::sleep(self.courtesy_pause).await;
            }
        }
    }

    /// One gated page fetch, retrying throttling responses with backoff.
    /// The attempt counter is per logical request and resets for each page.
    async fn fetch_page_gated(
        &self,
        from: TimeSec,
        to: TimeSec,
        throttle_retries: &mut u32,
    ) -> Result<Page, PageFailure> {
        let mut attempt: u32 = 0;
        loop {
            self.gate.acquire().await;
            match self.source.fetch_page(from, to).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_throttle() => {
                    if self.backoff.exhausted(attempt) {
                        return Err(PageFailure::ThrottleExhausted(attempt));
                    }
                    let delay = self.backoff.delay_for(attempt);
                    warn!(attempt, delay_ms = delay.as_millis() as u64, "throttled, backing off");
                    attempt += 1;
                    *throttle_retries += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(PageFailure::Fatal(error)),
            }
        }
    }
}

enum PageFailure {
    Fatal(SourceError),
    ThrottleExhausted(u32),
}
