mod routes;
mod models;
mod errors;
mod config;
mod logging;
mod app;
mod services;
mod external;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::external::gemini::GeminiGenerator;
use crate::external::yahoo::YahooProvider;
use crate::logging::LoggingConfig;
use crate::services::fund_overlap::FundCatalog;
use crate::services::index_service::IndexService;
use crate::services::market_history::{HistoryCache, MarketHistoryService};
use crate::services::rate_limiter::RateLimiter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env();

    let generator = Arc::new(GeminiGenerator::from_env()?);
    tracing::info!("🤖 Using holdings generator: Gemini");

    let provider = Arc::new(YahooProvider::new());
    tracing::info!("📊 Using market data provider: Yahoo Finance");

    let cache = HistoryCache::new(config.history_cache_capacity, config.history_cache_ttl_hours);
    let limiter = Arc::new(RateLimiter::new(5, 60));
    let history = Arc::new(MarketHistoryService::new(
        provider,
        cache,
        limiter,
        config.fetch_timeout,
    ));

    let funds = Arc::new(FundCatalog::load(&config.fund_data_dir));
    tracing::info!("🗂️ Fund catalog loaded: {} funds", funds.fund_count());

    let state = AppState {
        index: Arc::new(IndexService::new(generator)),
        history,
        funds,
        risk_free_rate: config.risk_free_rate,
    };
    let app = app::create_app(state, &config.allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Promptfolio backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
