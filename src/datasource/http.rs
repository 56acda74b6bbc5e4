//! HTTP client for the remote event log API.

use super::{LogSource, Page, SourceError};
use crate::domain::{Event, TimeSec};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// Remote error code meaning "too many requests"; treated as throttling
/// alongside HTTP 429/503.
const REMOTE_THROTTLE_CODE: i64 = 5;

/// Log source backed by the remote HTTP API.
#[derive(Debug, Clone)]
pub struct HttpLogSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpLogSource {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    /// Probe the key against the basic-profile endpoint. Returns the remote
    /// player id on success; used as an ops/diagnostics check only.
    pub async fn validate_key(&self) -> Result<i64, SourceError> {
        let url = format!(
            "{}/user/?selections=basic&key={}",
            self.base_url, self.api_key
        );
        let body = self.get_json(&url).await?;
        check_remote_error(&body)?;
        body.get("player_id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| SourceError::Parse("missing player_id".to_string()))
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 429 || status == 503 {
            return Err(SourceError::Throttled);
        }

        // The remote reports application errors in the payload with HTTP 200,
        // so parse the body before judging other statuses.
        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(SourceError::Http { status });
        }
        Ok(body)
    }
}

#[async_trait]
impl LogSource for HttpLogSource {
    async fn fetch_page(&self, from: TimeSec, to: TimeSec) -> Result<Page, SourceError> {
        debug!(from = from.as_i64(), to = to.as_i64(), "fetching log page");

        let url = format!(
            "{}/user/?selections=log&from={}&to={}&key={}",
            self.base_url,
            from.as_i64(),
            to.as_i64(),
            self.api_key
        );

        let body = self.get_json(&url).await?;
        check_remote_error(&body)?;

        let events = parse_log_page(&body);
        Ok(Page {
            events,
            http_status: 200,
        })
    }
}

/// Map an in-payload `error` object to a typed failure. The throttle code is
/// retryable; everything else aborts the crawl.
fn check_remote_error(body: &serde_json::Value) -> Result<(), SourceError> {
    let Some(error) = body.get("error") else {
        return Ok(());
    };
    let code = error.get("code").and_then(|v| v.as_i64()).unwrap_or(-1);
    if code == REMOTE_THROTTLE_CODE {
        return Err(SourceError::Throttled);
    }
    let message = error
        .get("error")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    Err(SourceError::Remote { code, message })
}

/// Parse the `log` object of a page response into events, newest first.
/// Entries that fail to parse are skipped with a warning; the feed is a
/// general-purpose log and unparseable entries carry nothing the ledger needs.
fn parse_log_page(body: &serde_json::Value) -> Vec<Event> {
    let mut events: Vec<Event> = match body.get("log").and_then(|v| v.as_object()) {
        Some(map) => map
            .iter()
            .filter_map(|(id, payload)| {
                let parsed = Event::from_remote_entry(id, payload);
                if parsed.is_none() {
                    warn!(id, "skipping unparseable log entry");
                }
                parsed
            })
            .collect(),
        None => Vec::new(),
    };
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
    events
}
