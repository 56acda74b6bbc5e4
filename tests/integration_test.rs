use axum::http::StatusCode;
use daybook::api::{self, AppState};
use daybook::cache::Cache;
use daybook::config::ContextDepth;
use daybook::datasource::{BackoffPolicy, MockLogSource, RateGate};
use daybook::domain::{Event, InstrumentId, Kind, LogId, TimeSec};
use daybook::orchestration::{Crawler, WindowService};
use daybook::store::MemoryStore;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn buy(id: &str, ts: i64, shares: f64, price: f64) -> Event {
    Event {
        id: LogId::new(id.to_string()),
        timestamp: TimeSec::new(ts),
        category: "Stocks".to_string(),
        kind: Kind::Buy,
        instrument: Some(InstrumentId::new("25".to_string())),
        shares: Some(shares),
        price: Some(price),
        gross: Some(shares * price),
    }
}

fn sell(id: &str, ts: i64, shares: f64, price: f64) -> Event {
    Event {
        id: LogId::new(id.to_string()),
        timestamp: TimeSec::new(ts),
        category: "Stocks".to_string(),
        kind: Kind::Sell,
        instrument: Some(InstrumentId::new("25".to_string())),
        shares: Some(shares),
        price: Some(price),
        gross: Some(shares * price),
    }
}

fn setup_test_app(source: Arc<MockLogSource>) -> axum::Router {
    let cache = Cache::new(Arc::new(MemoryStore::new()), 100_000);
    let crawler = Crawler::new(
        source,
        Arc::new(RateGate::new(Duration::from_millis(1))),
        BackoffPolicy {
            base: Duration::from_millis(1),
            cap: Duration::from_millis(4),
            jitter: Duration::ZERO,
            max_retries: None,
        },
        100,
        100_000,
        Duration::ZERO,
    );
    let service = Arc::new(WindowService::new(cache, crawler, ContextDepth::All));
    api::create_router(AppState::new(service))
}

async fn get_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            axum::body::Body::from(v.to_string())
        }
        None => axum::body::Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_app(Arc::new(MockLogSource::new()));
    let (status, body) = get_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = setup_test_app(Arc::new(MockLogSource::new()));
    let (status, body) = get_json(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["coveredRanges"], 0);
    assert_eq!(body["cachedEvents"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_window_endpoint_end_to_end() {
    let source = Arc::new(
        MockLogSource::new()
            .with_event(buy("b1", 50, 100.0, 5.0))
            .with_event(sell("s1", 60, 100.0, 10.0)),
    );
    let app = setup_test_app(source);

    let (status, body) = get_json(&app, "GET", "/v1/window?from=0&to=100", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["fetched"], 2);
    assert_eq!(body["partial"], false);

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);

    // Rows come newest first, so the sell leads.
    let sell_row = &rows[0];
    assert_eq!(sell_row["action"], "SELL");
    assert_eq!(sell_row["net"], 999);
    assert_eq!(sell_row["fee"], 1);
    assert_eq!(sell_row["gross"], 1000);
    assert_eq!(sell_row["costBasis"], 500.0);
    assert_eq!(sell_row["profit"], 499.0);
    assert_eq!(sell_row["needsManualInput"], false);

    let buy_row = &rows[1];
    assert_eq!(buy_row["action"], "BUY");
    assert_eq!(buy_row["net"], serde_json::Value::Null);

    assert_eq!(body["summary"]["totalSell"], 999);
    assert_eq!(body["summary"]["totalFees"], 1);
    assert_eq!(body["summary"]["totalProfit"], 499.0);
}

#[tokio::test]
async fn test_window_endpoint_rejects_inverted_range() {
    let app = setup_test_app(Arc::new(MockLogSource::new()));
    let (status, body) = get_json(&app, "GET", "/v1/window?from=100&to=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid window"));
}

#[tokio::test(start_paused = true)]
async fn test_override_set_and_clear_flow() {
    // An orphan sell: no buy history, so the cost basis is unresolvable
    // until an override is recorded.
    let source = Arc::new(MockLogSource::new().with_event(sell("s1", 60, 100.0, 10.0)));
    let app = setup_test_app(source);

    let (_, body) = get_json(&app, "GET", "/v1/window?from=0&to=100", None).await;
    assert_eq!(body["rows"][0]["needsManualInput"], true);
    assert_eq!(body["rows"][0]["profit"], serde_json::Value::Null);

    let (status, _) = get_json(
        &app,
        "PUT",
        "/v1/overrides/s1",
        Some(serde_json::json!({"buyPrice": 5.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "GET", "/v1/window?from=0&to=100", None).await;
    assert_eq!(body["rows"][0]["needsManualInput"], false);
    assert_eq!(body["rows"][0]["manualOverrideUsed"], true);
    assert_eq!(body["rows"][0]["costBasis"], 500.0);
    assert_eq!(body["rows"][0]["profit"], 499.0);

    let (status, _) = get_json(&app, "DELETE", "/v1/overrides/s1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "GET", "/v1/window?from=0&to=100", None).await;
    assert_eq!(body["rows"][0]["needsManualInput"], true);
}

#[tokio::test]
async fn test_clear_missing_override_is_not_found() {
    let app = setup_test_app(Arc::new(MockLogSource::new()));
    let (status, _) = get_json(&app, "DELETE", "/v1/overrides/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_clear_cache_forces_refetch() {
    let source = Arc::new(MockLogSource::new().with_event(buy("b1", 50, 10.0, 5.0)));
    let app = setup_test_app(source.clone());

    get_json(&app, "GET", "/v1/window?from=0&to=100", None).await;
    let calls_before = source.calls();

    let (status, _) = get_json(&app, "POST", "/v1/admin/clear-cache", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "GET", "/v1/window?from=0&to=100", None).await;
    assert_eq!(body["fetched"], 1, "coverage was dropped, so the window refetches");
    assert!(source.calls() > calls_before);
}
