//! Outbound request pacing: the rate gate and the throttling backoff policy.

use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes outbound requests to at most one per `min_gap`.
///
/// `acquire` suspends the caller cooperatively until the gap since the
/// previous granted request has elapsed, then records the grant. It must be
/// called immediately before every outbound request, including retries.
#[derive(Debug)]
pub struct RateGate {
    min_gap: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_grant: Mutex::new(None),
        }
    }

    /// Wait until a request may go out. Waiters queue on the internal lock,
    /// so concurrent callers are granted one gap apart.
    pub async fn acquire(&self) {
        let mut last = self.last_grant.lock().await;
        if let Some(prev) = *last {
            let next_allowed = prev + self.min_gap;
            let now = Instant::now();
            if next_allowed > now {
                tokio::time::sleep_until(next_allowed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Exponential backoff with jitter for throttling responses.
///
/// Delay for attempt `n` is `min(cap, base * 2^n) + uniform(0, jitter)`.
/// Attempt counters are per logical request: the caller resets to zero for
/// each new page, not globally.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub jitter: Duration,
    /// Optional cap on throttling retries. `None` retries indefinitely, the
    /// progress-over-giving-up policy: a persistently throttling peer can
    /// stall a crawl forever, which is accepted and left to the caller's
    /// budget to bound.
    pub max_retries: Option<u32>,
}

impl BackoffPolicy {
    /// The delay to sleep before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // 2^attempt saturates well past any sane cap; clamp the shift.
        let factor = 2u64.saturating_pow(attempt.min(32));
        let exp_ms = (self.base.as_millis() as u64).saturating_mul(factor);
        let capped = Duration::from_millis(exp_ms).min(self.cap);

        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
        };
        capped + jitter
    }

    /// True once `attempt` exceeds the configured retry cap.
    pub fn exhausted(&self, attempt: u32) -> bool {
        match self.max_retries {
            Some(max) => attempt >= max,
            None => false,
        }
    }
}
