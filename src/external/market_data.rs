use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{FetchInterval, FinancialMetrics, PricePoint};

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no data for ticker: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,

    #[error("request timed out")]
    Timeout,
}

/// Source of historical closes and valuation metrics.
///
/// Implementations return ascending, null-free series; callers treat every
/// error as "this ticker is unavailable right now" and recover locally.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch close history for `ticker` over `[start, end]` at the given
    /// granularity, sorted oldest first.
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: FetchInterval,
    ) -> Result<Vec<PricePoint>, MarketDataError>;

    /// Fetch valuation metrics (P/E, yield, market cap, ...) for `ticker`.
    async fn fetch_metrics(&self, ticker: &str) -> Result<FinancialMetrics, MarketDataError>;
}
