use daybook::datasource::{BackoffPolicy, HttpLogSource, RateGate};
use daybook::orchestration::{Crawler, WindowService};
use daybook::store::JsonFileStore;
use daybook::{api, cache::Cache, config::Config};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Open the durable store
    let store = match JsonFileStore::open(&config.store_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Failed to open store at {}: {}", config.store_path, e);
            std::process::exit(1);
        }
    };

    let source = Arc::new(HttpLogSource::new(
        config.log_api_url.clone(),
        config.log_api_key.clone(),
    ));

    // One startup probe so a bad key fails loudly instead of surfacing as a
    // remote error on the first window query.
    match source.validate_key().await {
        Ok(player_id) => tracing::info!(player_id, "log API key validated"),
        Err(e) => tracing::warn!(error = %e, "log API key probe failed, continuing"),
    }

    let cache = Cache::new(store, config.log_cap);
    let gate = Arc::new(RateGate::new(Duration::from_millis(
        config.min_request_gap_ms,
    )));
    let backoff = BackoffPolicy {
        base: Duration::from_millis(config.backoff_base_ms),
        cap: Duration::from_millis(config.backoff_cap_ms),
        jitter: Duration::from_millis(config.backoff_jitter_ms),
        max_retries: config.max_throttle_retries,
    };
    let crawler = Crawler::new(
        source,
        gate,
        backoff,
        config.page_budget,
        config.event_budget,
        Duration::from_millis(config.courtesy_pause_ms),
    );
    let service = Arc::new(WindowService::new(cache, crawler, config.context_depth));

    // Create router
    let app = api::create_router(api::AppState::new(service));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
