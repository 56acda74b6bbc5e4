use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Runtime configuration, read from the environment. Defaults mirror the
/// constants the service has been tuned with against the live log API
/// (~1.3s request gap, 60-page pulls, 2s courtesy pause).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_path: String,
    pub log_api_url: String,
    pub log_api_key: String,
    pub min_request_gap_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
    pub backoff_jitter_ms: u64,
    /// `None` retries throttling responses indefinitely.
    pub max_throttle_retries: Option<u32>,
    pub page_budget: usize,
    pub event_budget: usize,
    pub courtesy_pause_ms: u64,
    pub log_cap: usize,
    pub context_depth: ContextDepth,
}

/// How much cached history seeds opening lots before a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextDepth {
    /// No context: every sell opening a window starts from an empty lot.
    None,
    /// All stored events before the window start.
    All,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(&env_map, "PORT", 8080u16)?;

        let store_path = env_map
            .get("STORE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("STORE_PATH".to_string()))?;

        let log_api_url = env_map
            .get("LOG_API_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("LOG_API_URL".to_string()))?;

        let log_api_key = env_map
            .get("LOG_API_KEY")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("LOG_API_KEY".to_string()))?;

        let min_request_gap_ms = parse_or(&env_map, "MIN_REQUEST_GAP_MS", 1300u64)?;
        let backoff_base_ms = parse_or(&env_map, "BACKOFF_BASE_MS", 1000u64)?;
        let backoff_cap_ms = parse_or(&env_map, "BACKOFF_CAP_MS", 30000u64)?;
        let backoff_jitter_ms = parse_or(&env_map, "BACKOFF_JITTER_MS", 1200u64)?;

        let max_throttle_retries = match env_map.get("MAX_THROTTLE_RETRIES") {
            None => None,
            Some(s) => Some(s.parse::<u32>().map_err(|_| {
                ConfigError::InvalidValue(
                    "MAX_THROTTLE_RETRIES".to_string(),
                    "must be a valid u32".to_string(),
                )
            })?),
        };

        let page_budget = parse_or(&env_map, "PAGE_BUDGET", 60usize)?;
        let event_budget = parse_or(&env_map, "EVENT_BUDGET", 50000usize)?;
        let courtesy_pause_ms = parse_or(&env_map, "COURTESY_PAUSE_MS", 2000u64)?;
        let log_cap = parse_or(&env_map, "LOG_CAP", 500000usize)?;

        let context_depth = match env_map
            .get("CONTEXT_DEPTH")
            .map(|s| s.as_str())
            .unwrap_or("all")
        {
            "all" => ContextDepth::All,
            "none" => ContextDepth::None,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CONTEXT_DEPTH".to_string(),
                    format!("must be all or none, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            store_path,
            log_api_url,
            log_api_key,
            min_request_gap_ms,
            backoff_base_ms,
            backoff_cap_ms,
            backoff_jitter_ms,
            max_throttle_retries,
            page_budget,
            event_budget,
            courtesy_pause_ms,
            log_cap,
            context_depth,
        })
    }
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(s) => s.parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), "must be a valid number".to_string())
        }),
    }
}
