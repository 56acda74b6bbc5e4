//! Scripted log source for tests: no network, page-size emulation, injectable
//! throttles and remote failures, and a call counter for no-duplicate-fetch
//! assertions.

use super::{LogSource, Page, SourceError};
use crate::domain::{Event, TimeSec};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
pub struct MockLogSource {
    events: Vec<Event>,
    page_size: usize,
    calls: AtomicUsize,
    /// Number of leading calls answered with `Throttled`.
    throttles: Mutex<usize>,
    /// Error returned once the call count reaches this index (0-based).
    fail_at: Option<(usize, SourceError)>,
}

impl MockLogSource {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            page_size: usize::MAX,
            calls: AtomicUsize::new(0),
            throttles: Mutex::new(0),
            fail_at: None,
        }
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events.extend(events);
        self
    }

    /// Cap events returned per page, forcing the crawler to paginate.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Answer the first `n` calls with a throttling response.
    pub fn with_throttles(mut self, n: usize) -> Self {
        self.throttles = Mutex::new(n);
        self
    }

    /// Fail the call with index `call` (0-based) with `error`.
    pub fn with_failure_at(mut self, call: usize, error: SourceError) -> Self {
        self.fail_at = Some((call, error));
        self
    }

    /// Total fetch_page calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLogSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn fetch_page(&self, from: TimeSec, to: TimeSec) -> Result<Page, SourceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut throttles = self.throttles.lock().expect("mock lock");
            if *throttles > 0 {
                *throttles -= 1;
                return Err(SourceError::Throttled);
            }
        }

        if let Some((fail_call, error)) = &self.fail_at {
            if call == *fail_call {
                return Err(error.clone());
            }
        }

        let mut hits: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.timestamp >= from && e.timestamp <= to)
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        hits.truncate(self.page_size);

        Ok(Page {
            events: hits,
            http_status: 200,
        })
    }
}
