//! Service-level flows across the durable store: resumable crawls, partial
//! preservation on failure, and context seeding.

use daybook::cache::Cache;
use daybook::config::ContextDepth;
use daybook::datasource::{BackoffPolicy, MockLogSource, RateGate, SourceError};
use daybook::domain::{Event, InstrumentId, Kind, LogId, TimeSec};
use daybook::orchestration::{Crawler, WindowError, WindowService};
use daybook::store::{JsonFileStore, Store};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

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

fn service_over(
    store: Arc<dyn Store>,
    source: Arc<MockLogSource>,
    page_budget: usize,
    context_depth: ContextDepth,
) -> WindowService {
    let cache = Cache::new(store, 100_000);
    let crawler = Crawler::new(
        source,
        Arc::new(RateGate::new(Duration::from_millis(1))),
        BackoffPolicy {
            base: Duration::from_millis(1),
            cap: Duration::from_millis(4),
            jitter: Duration::ZERO,
            max_retries: None,
        },
        page_budget,
        100_000,
        Duration::ZERO,
    );
    WindowService::new(cache, crawler, context_depth)
}

fn five_buys() -> Vec<Event> {
    vec![
        buy("a", 10, 1.0, 1.0),
        buy("b", 20, 1.0, 1.0),
        buy("c", 30, 1.0, 1.0),
        buy("d", 40, 1.0, 1.0),
        buy("e", 50, 1.0, 1.0),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_budget_paused_crawl_resumes_across_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    // First run: a one-page budget can only pull the newest page.
    let source = Arc::new(MockLogSource::new().with_events(five_buys()).with_page_size(2));
    let store: Arc<dyn Store> = Arc::new(JsonFileStore::open(&path).unwrap());
    let svc = service_over(store, source, 1, ContextDepth::All);

    let first = svc.get_window(TimeSec::new(0), TimeSec::new(100)).await.unwrap();
    assert!(first.partial);
    assert_eq!(first.fetched, 2);
    assert_eq!(first.rows.len(), 2, "partial window serves what is cached");
    drop(svc);

    // Second run against the same file: the persisted cursor resumes below
    // the oldest already-fetched event instead of re-walking page one.
    let source = Arc::new(MockLogSource::new().with_events(five_buys()).with_page_size(2));
    let store: Arc<dyn Store> = Arc::new(JsonFileStore::open(&path).unwrap());
    let svc = service_over(store, source.clone(), 100, ContextDepth::All);

    let second = svc.get_window(TimeSec::new(0), TimeSec::new(100)).await.unwrap();
    assert!(!second.partial);
    assert_eq!(second.fetched, 3, "only the three events below the cursor");
    assert_eq!(second.rows.len(), 5);
    // Two pages below the cursor, then the empty page that ends the crawl.
    assert_eq!(source.calls(), 3);

    // Fully covered now: a third query costs nothing.
    let source_calls = source.calls();
    let third = svc.get_window(TimeSec::new(0), TimeSec::new(100)).await.unwrap();
    assert_eq!(third.fetched, 0);
    assert_eq!(source.calls(), source_calls);
}

#[tokio::test(start_paused = true)]
async fn test_crawl_abort_keeps_partial_without_claiming_coverage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let source = Arc::new(
        MockLogSource::new()
            .with_events(five_buys())
            .with_page_size(2)
            .with_failure_at(
                1,
                SourceError::Remote {
                    code: 2,
                    message: "Incorrect key".to_string(),
                },
            ),
    );
    let store: Arc<dyn Store> = Arc::new(JsonFileStore::open(&path).unwrap());
    let svc = service_over(store, source, 100, ContextDepth::All);

    let err = svc.get_window(TimeSec::new(0), TimeSec::new(100)).await.unwrap_err();
    assert!(matches!(err, WindowError::Crawl(_)));

    // The first page survives in the log store, but coverage makes no claim,
    // so a healthy retry fetches the range again.
    assert_eq!(svc.cache().load_logs().unwrap().len(), 2);
    assert!(svc.cache().load_coverage().unwrap().intervals().is_empty());

    let source = Arc::new(MockLogSource::new().with_events(five_buys()).with_page_size(2));
    let store: Arc<dyn Store> = Arc::new(JsonFileStore::open(&path).unwrap());
    let svc = service_over(store, source, 100, ContextDepth::All);

    let report = svc.get_window(TimeSec::new(0), TimeSec::new(100)).await.unwrap();
    assert!(!report.partial);
    assert_eq!(report.rows.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_context_depth_seeds_opening_lots() {
    // Buy before the window, sell inside it.
    let events = vec![buy("b1", 10, 100.0, 5.0), sell("s1", 60, 100.0, 10.0)];

    let source = Arc::new(MockLogSource::new().with_events(events.clone()));
    let store: Arc<dyn Store> = Arc::new(daybook::store::MemoryStore::new());
    let svc = service_over(store, source, 100, ContextDepth::All);

    // Cover the full history first so the buy is cached as context.
    svc.get_window(TimeSec::new(0), TimeSec::new(100)).await.unwrap();
    let report = svc.get_window(TimeSec::new(55), TimeSec::new(100)).await.unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].cost_basis, Some(500.0));
    assert!(!report.rows[0].needs_manual_input);

    // With context disabled the same sell is an orphan.
    let source = Arc::new(MockLogSource::new().with_events(events));
    let store: Arc<dyn Store> = Arc::new(daybook::store::MemoryStore::new());
    let svc = service_over(store, source, 100, ContextDepth::None);

    svc.get_window(TimeSec::new(0), TimeSec::new(100)).await.unwrap();
    let report = svc.get_window(TimeSec::new(55), TimeSec::new(100)).await.unwrap();
    assert!(report.rows[0].needs_manual_input);
    assert_eq!(report.rows[0].cost_basis, None);
}
