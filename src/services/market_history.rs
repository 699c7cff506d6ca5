use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{FetchInterval, FinancialMetrics, PricePoint};
use crate::services::rate_limiter::RateLimiter;

/// Cache key for one fetched window. Interval is part of the key so a
/// weekly 5-year series never shadows a daily one for the same dates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: FetchInterval,
}

#[derive(Debug, Clone)]
struct CachedHistory {
    points: Vec<PricePoint>,
    fetched_at: DateTime<Utc>,
}

/// Thread-safe, bounded TTL cache for fetched price histories.
///
/// Owned by whoever constructs the service (no globals), so tests can hand
/// each service instance its own cache and assert on hit behavior.
#[derive(Clone)]
pub struct HistoryCache {
    entries: Arc<DashMap<HistoryKey, CachedHistory>>,
    capacity: usize,
    ttl: chrono::Duration,
}

impl HistoryCache {
    pub fn new(capacity: usize, ttl_hours: i64) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            capacity,
            ttl: chrono::Duration::hours(ttl_hours),
        }
    }

    /// Look up a window, dropping the entry if its TTL has lapsed.
    pub fn get(&self, key: &HistoryKey) -> Option<Vec<PricePoint>> {
        if let Some(entry) = self.entries.get(key) {
            let cached = entry.value();
            if Utc::now() < cached.fetched_at + self.ttl {
                return Some(cached.points.clone());
            }
            // TTL expired, remove from cache
            drop(entry); // Release the read lock
            self.entries.remove(key);
        }
        None
    }

    /// Insert a window. At capacity, expired entries are swept first; if the
    /// cache is still full the insert is skipped - the fetch result is
    /// returned to the caller either way, only reuse is lost.
    pub fn insert(&self, key: HistoryKey, points: Vec<PricePoint>) {
        if self.entries.len() >= self.capacity {
            self.cleanup_expired();
            if self.entries.len() >= self.capacity {
                debug!("History cache full ({} entries), skipping insert", self.capacity);
                return;
            }
        }

        self.entries.insert(
            key,
            CachedHistory {
                points,
                fetched_at: Utc::now(),
            },
        );
    }

    /// Clear all expired entries from the cache
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        let ttl = self.ttl;
        self.entries.retain(|_, cached| now < cached.fetched_at + ttl);
    }

    /// Get the number of cached windows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-through history fetching over an injected provider.
///
/// Every failure mode (network, parse, rate limit, timeout) surfaces as an
/// explicit `Err`; batch callers keep whatever succeeded and the pipeline
/// above decides how to recover. Nothing here panics or aborts a request.
pub struct MarketHistoryService {
    provider: Arc<dyn MarketDataProvider>,
    cache: HistoryCache,
    limiter: Arc<RateLimiter>,
    fetch_timeout: Duration,
}

impl MarketHistoryService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: HistoryCache,
        limiter: Arc<RateLimiter>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            limiter,
            fetch_timeout,
        }
    }

    /// Fetch one ticker's history, serving from cache when the exact window
    /// and interval were fetched within the TTL.
    pub async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: FetchInterval,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let key = HistoryKey {
            ticker: ticker.to_string(),
            start,
            end,
            interval,
        };

        if let Some(points) = self.cache.get(&key) {
            debug!("Using cached history for {}", ticker);
            return Ok(points);
        }

        let _guard = self.limiter.acquire().await;

        let points = match tokio::time::timeout(
            self.fetch_timeout,
            self.provider.fetch_history(ticker, start, end, interval),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!("History fetch for {} timed out after {:?}", ticker, self.fetch_timeout);
                return Err(MarketDataError::Timeout);
            }
        };

        debug!("Fetched {} points for {}", points.len(), ticker);
        self.cache.insert(key, points.clone());
        Ok(points)
    }

    /// Fetch valuation metrics for one ticker. Not cached: callers want
    /// these once per response, for the benchmark only.
    pub async fn fetch_metrics(&self, ticker: &str) -> Result<FinancialMetrics, MarketDataError> {
        let _guard = self.limiter.acquire().await;

        match tokio::time::timeout(self.fetch_timeout, self.provider.fetch_metrics(ticker)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Metrics fetch for {} timed out after {:?}", ticker, self.fetch_timeout);
                Err(MarketDataError::Timeout)
            }
        }
    }

    /// Fetch many tickers for one window: a rate-limited concurrent pass,
    /// then one sequential retry for each miss. Tickers that fail both
    /// passes are simply absent from the result map.
    pub async fn fetch_batch(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
        interval: FetchInterval,
    ) -> HashMap<String, Vec<PricePoint>> {
        info!("Batch fetching history for {} tickers", tickers.len());

        let fetches = tickers.iter().map(|ticker| {
            let ticker = ticker.clone();
            async move {
                let result = self.fetch_history(&ticker, start, end, interval).await;
                (ticker, result)
            }
        });

        let mut results = HashMap::new();
        let mut failed = Vec::new();

        for (ticker, result) in join_all(fetches).await {
            match result {
                Ok(points) => {
                    results.insert(ticker, points);
                }
                Err(e) => {
                    warn!("Batch fetch failed for {}: {}", ticker, e);
                    failed.push(ticker);
                }
            }
        }

        // Second chance, one at a time - transient 429s and timeouts often
        // clear once the concurrent burst is over
        for ticker in failed {
            match self.fetch_history(&ticker, start, end, interval).await {
                Ok(points) => {
                    results.insert(ticker, points);
                }
                Err(e) => {
                    warn!("Retry fetch failed for {}, leaving it out: {}", ticker, e);
                }
            }
        }

        info!(
            "Successfully fetched history for {} out of {} tickers",
            results.len(),
            tickers.len()
        );
        results
    }
}
