use aztlan_api::client::{DEFAULT_TIMEOUT, FIRST_BASE_URL, TOA_BASE_URL};
use aztlan_api::llm::{LLM_API_URL, LLM_MODEL};
use aztlan_api::nasa::NASA_BASE_URL;
use aztlan_api::scrape::SCRAPE_URL;
use log::{info, warn};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_FEED_CAP: usize = 8;

/// Process-wide configuration, read once at startup. Missing credentials turn
/// the matching feature offline instead of failing startup.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub bind: String,
    pub toa_api_key: Option<String>,
    pub toa_base_url: String,
    pub toa_region: String,
    pub toa_season: String,
    pub first_username: Option<String>,
    pub first_token: Option<String>,
    pub first_base_url: String,
    pub first_season: String,
    pub first_country: String,
    pub scrape_url: String,
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub nasa_base_url: String,
    pub nasa_feed_cap: usize,
    pub upstream_timeout: Duration,
    pub knowledge_base: Option<PathBuf>,
    /// Append raw error text to user-facing LLM failure messages.
    pub debug_errors: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            toa_api_key: None,
            toa_base_url: TOA_BASE_URL.into(),
            toa_region: "MX".into(),
            toa_season: "2425".into(),
            first_username: None,
            first_token: None,
            first_base_url: FIRST_BASE_URL.into(),
            first_season: "2024".into(),
            first_country: "Mexico".into(),
            scrape_url: SCRAPE_URL.into(),
            llm_api_key: None,
            llm_api_url: LLM_API_URL.into(),
            llm_model: LLM_MODEL.into(),
            nasa_base_url: NASA_BASE_URL.into(),
            nasa_feed_cap: DEFAULT_FEED_CAP,
            upstream_timeout: DEFAULT_TIMEOUT,
            knowledge_base: None,
            debug_errors: false,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        let defaults = Self::default();
        let settings = Self {
            bind: string_or("AZTLAN_BIND", defaults.bind),
            toa_api_key: secret("TOA_API_KEY"),
            toa_base_url: string_or("TOA_BASE_URL", defaults.toa_base_url),
            toa_region: string_or("TOA_REGION", defaults.toa_region),
            toa_season: string_or("TOA_SEASON", defaults.toa_season),
            first_username: secret("FTC_EVENTS_USERNAME"),
            first_token: secret("FTC_EVENTS_TOKEN"),
            first_base_url: string_or("FTC_EVENTS_BASE_URL", defaults.first_base_url),
            first_season: string_or("FTC_SEASON", defaults.first_season),
            first_country: string_or("FTC_COUNTRY", defaults.first_country),
            scrape_url: string_or("FTC_SCRAPE_URL", defaults.scrape_url),
            llm_api_key: secret("LLM_API_KEY"),
            llm_api_url: string_or("LLM_API_URL", defaults.llm_api_url),
            llm_model: string_or("LLM_MODEL", defaults.llm_model),
            nasa_base_url: string_or("NASA_BASE_URL", defaults.nasa_base_url),
            nasa_feed_cap: parse_or("NASA_FEED_CAP", defaults.nasa_feed_cap),
            upstream_timeout: Duration::from_secs(parse_or(
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )),
            knowledge_base: var("AZTLAN_KNOWLEDGE_BASE").map(PathBuf::from),
            debug_errors: var("AZTLAN_DEBUG").is_some_and(|v| is_truthy(&v)),
        };
        settings.log_features();
        settings
    }

    pub fn toa_enabled(&self) -> bool {
        self.toa_api_key.is_some()
    }

    pub fn first_enabled(&self) -> bool {
        self.first_username.is_some() && self.first_token.is_some()
    }

    pub fn llm_enabled(&self) -> bool {
        self.llm_api_key.is_some()
    }

    fn log_features(&self) {
        let state = |on: bool| if on { "live" } else { "offline (mock data)" };
        info!("TOA: {}", state(self.toa_enabled()));
        info!("FIRST events API: {}", state(self.first_enabled()));
        info!("LLM relay: {}", if self.llm_enabled() { "enabled" } else { "offline (rules only)" });
    }
}

/// Non-empty, trimmed environment value.
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secret(key: &str) -> Option<String> {
    let value = var(key);
    if value.is_none() {
        info!("{key} not set, feature runs offline");
    }
    value
}

fn string_or(key: &str, default: String) -> String {
    var(key).unwrap_or(default)
}

fn parse_or<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match var(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}; using default {default}");
            default
        }),
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
