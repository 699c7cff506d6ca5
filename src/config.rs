use std::path::PathBuf;
use std::time::Duration;

/// Runtime knobs read once at startup. Every field has a default that
/// works for local development without a .env file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds on
    pub port: u16,
    /// Per-request deadline on outbound market data calls
    pub fetch_timeout: Duration,
    /// Maximum number of cached price history windows
    pub history_cache_capacity: usize,
    /// How long a cached history window stays fresh
    pub history_cache_ttl_hours: i64,
    /// Annual risk-free rate used in Sharpe/Sortino/alpha, as a fraction
    pub risk_free_rate: f64,
    /// Directory holding the ticker mapping CSV and fund disclosure files
    pub fund_data_dir: PathBuf,
    /// Comma-separated CORS origins, "*" for any
    pub allowed_origins: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 3000),
            fetch_timeout: Duration::from_secs(env_parse("FETCH_TIMEOUT_SECS", 10)),
            history_cache_capacity: env_parse("HISTORY_CACHE_CAPACITY", 512),
            history_cache_ttl_hours: env_parse("HISTORY_CACHE_TTL_HOURS", 24),
            risk_free_rate: env_parse("RISK_FREE_RATE", 0.02),
            fund_data_dir: PathBuf::from(
                std::env::var("FUND_DATA_DIR").unwrap_or_else(|_| "etc".to_string()),
            ),
            allowed_origins: std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
