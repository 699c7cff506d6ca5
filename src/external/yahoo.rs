use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{FetchInterval, FinancialMetrics, PricePoint};

/// Yahoo Finance provider - free chart and quote-summary APIs, no key needed
///
/// Covers the index tickers (^GSPC, ^NSEI, ...) and international listings
/// (RELIANCE.NS, *.TO) that generated portfolios routinely contain.
pub struct YahooProvider {
    client: reqwest::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; Promptfolio/0.1)")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatistics>,
    price: Option<PriceModule>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNum>,
    #[serde(rename = "dividendYield")]
    dividend_yield: Option<RawNum>,
    beta: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct KeyStatistics {
    #[serde(rename = "priceToBook")]
    price_to_book: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "marketCap")]
    market_cap: Option<RawNum>,
}

// Yahoo wraps numbers as {"raw": 1.23, "fmt": "1.23"} and sends {} for
// missing values.
#[derive(Debug, Default, Deserialize)]
struct RawNum {
    raw: Option<f64>,
}

fn unwrap_raw(num: Option<RawNum>) -> Option<f64> {
    num.and_then(|n| n.raw)
}

/// Midnight UTC of `date` as a Unix timestamp, for period1/period2 params.
fn to_unix(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: FetchInterval,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        // Yahoo Finance v8 chart endpoint; period2 is exclusive
        let url = format!("https://query1.finance.yahoo.com/v8/finance/chart/{}", ticker);

        let period1 = to_unix(start).to_string();
        let period2 = to_unix(end + Duration::days(1)).to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("interval", interval.as_str()),
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        // Check HTTP status
        if !resp.status().is_success() {
            match resp.status().as_u16() {
                404 => return Err(MarketDataError::NotFound(ticker.to_string())),
                429 => return Err(MarketDataError::RateLimited),
                _ => {
                    return Err(MarketDataError::BadResponse(format!(
                        "HTTP {}",
                        resp.status()
                    )))
                }
            }
        }

        let body: YahooChartResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        // Check for API errors
        if let Some(error) = body.chart.error {
            if error.description.contains("No data found") {
                return Err(MarketDataError::NotFound(ticker.to_string()));
            }
            return Err(MarketDataError::BadResponse(error.description));
        }

        let results = body
            .chart
            .result
            .ok_or_else(|| MarketDataError::BadResponse("No results in response".into()))?;

        if results.is_empty() {
            return Err(MarketDataError::NotFound(ticker.to_string()));
        }

        let result = &results[0];
        let timestamps = result
            .timestamp
            .as_ref()
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

        if result.indicators.quote.is_empty() {
            return Err(MarketDataError::BadResponse(
                "No quote data in response".into(),
            ));
        }

        let closes = result.indicators.quote[0]
            .close
            .as_ref()
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

        if timestamps.len() != closes.len() {
            return Err(MarketDataError::Parse(
                "Timestamp and close price arrays have different lengths".into(),
            ));
        }

        // Convert to our format, skipping null closes (market holidays, halts)
        let mut points: Vec<PricePoint> = timestamps
            .iter()
            .zip(closes.iter())
            .filter_map(|(timestamp, close_opt)| {
                let close = (*close_opt)?;
                let date = chrono::DateTime::from_timestamp(*timestamp, 0)
                    .map(|dt| dt.date_naive())?;
                Some(PricePoint { date, close })
            })
            .collect();

        // Sort by date (oldest first); weekly bars can arrive unordered
        points.sort_by(|a, b| a.date.cmp(&b.date));
        points.dedup_by_key(|p| p.date);

        if points.is_empty() {
            return Err(MarketDataError::NotFound(ticker.to_string()));
        }

        Ok(points)
    }

    async fn fetch_metrics(&self, ticker: &str) -> Result<FinancialMetrics, MarketDataError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}",
            ticker
        );

        let resp = self
            .client
            .get(&url)
            .query(&[("modules", "summaryDetail,defaultKeyStatistics,price")])
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            match resp.status().as_u16() {
                404 => return Err(MarketDataError::NotFound(ticker.to_string())),
                429 => return Err(MarketDataError::RateLimited),
                _ => {
                    return Err(MarketDataError::BadResponse(format!(
                        "HTTP {}",
                        resp.status()
                    )))
                }
            }
        }

        let body: QuoteSummaryResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        if let Some(error) = body.quote_summary.error {
            return Err(MarketDataError::BadResponse(error.description));
        }

        let mut results = body
            .quote_summary
            .result
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

        if results.is_empty() {
            return Err(MarketDataError::NotFound(ticker.to_string()));
        }

        let result = results.remove(0);
        let summary = result.summary_detail.unwrap_or_default();

        Ok(FinancialMetrics {
            ticker: ticker.to_string(),
            pe_ratio: unwrap_raw(summary.trailing_pe),
            dividend_yield: unwrap_raw(summary.dividend_yield),
            beta: unwrap_raw(summary.beta),
            market_cap: unwrap_raw(result.price.and_then(|p| p.market_cap)),
            price_to_book: unwrap_raw(result.key_statistics.and_then(|k| k.price_to_book)),
        })
    }
}
