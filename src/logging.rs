use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Subscriber settings, read from the environment separately from
/// `AppConfig` so logging can come up before anything else logs.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub service_name: String,
    pub environment: String,
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            filter: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "promptfolio".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            loki_enabled: std::env::var("LOKI_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            loki_url: std::env::var("LOKI_URL").ok(),
        }
    }

    /// The Loki endpoint to ship to, if shipping is requested at all.
    /// Requesting it without an URL is a startup error, not a silent skip.
    fn loki_endpoint(&self) -> Result<Option<String>, String> {
        if !self.loki_enabled {
            return Ok(None);
        }
        self.loki_url
            .clone()
            .map(Some)
            .ok_or_else(|| "LOKI_ENABLED is true but LOKI_URL is not set".to_string())
    }
}

/// Install the global subscriber: console fmt layer always, plus a Loki
/// shipping layer when the `loki` feature and LOKI_ENABLED are both on.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = config.loki_endpoint()?;

    #[cfg(feature = "loki")]
    {
        if let Some(endpoint) = endpoint {
            return init_with_loki(&config, &endpoint);
        }
    }

    #[cfg(not(feature = "loki"))]
    {
        if endpoint.is_some() {
            eprintln!("LOKI_ENABLED is set but this build lacks the loki feature, logging to console only");
        }
    }

    init_console(&config)
}

fn init_console(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("📊 Console logging initialized");
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(
    config: &LoggingConfig,
    endpoint: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = url::Url::parse(endpoint)?;

    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url)?;

    // The layer only buffers; this task does the shipping
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.filter))
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .init();

    tracing::info!("📊 Logging initialized, shipping to Loki at {}", endpoint);
    Ok(())
}
