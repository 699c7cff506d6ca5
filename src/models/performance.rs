use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a series came from.
///
/// Kept internal (never serialized) so callers can log and test fallback
/// behavior without the API contract leaking provenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeriesOrigin {
    #[default]
    Market,
    Synthetic,
}

/// Composite index and benchmark series over a shared date axis.
///
/// `index_values` and `benchmark_values` are normalized to start at 100 and
/// have the same length as `dates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceData {
    pub dates: Vec<NaiveDate>,
    pub index_values: Vec<f64>,
    pub benchmark_values: Vec<f64>,
    pub benchmark_name: String,
    pub benchmark_ticker: String,
    #[serde(skip)]
    pub index_origin: SeriesOrigin,
    #[serde(skip)]
    pub benchmark_origin: SeriesOrigin,
}

/// Response for the performance endpoint: the series fields at top level
/// with the statistics blocks alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceResponse {
    #[serde(flatten)]
    pub performance_data: PerformanceData,
    pub stats: PerformanceStats,
    pub benchmark_stats: BenchmarkStats,
}

/// Return and risk statistics for a normalized value series.
///
/// All returns, volatility, drawdown and alpha are percentages; ratios are
/// unitless. Benchmark-relative fields are absent when no benchmark series
/// of matching length was available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Cumulative return over the full window, as a percentage
    pub total_return: f64,

    /// Geometric annualized return (CAGR), as a percentage
    pub annualized_return: f64,

    /// Annualized standard deviation of daily returns, as a percentage
    pub volatility: f64,

    /// Maximum peak-to-trough decline, as a negative percentage (0 if none)
    pub max_drawdown: f64,

    /// Annualized Sharpe ratio (0 when volatility is 0)
    pub sharpe_ratio: f64,

    /// Annualized Sortino ratio (equals Sharpe when no negative returns)
    pub sortino_ratio: f64,

    /// Beta coefficient relative to the benchmark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,

    /// Jensen's alpha relative to the benchmark, as a percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,

    /// Pearson correlation of daily returns with the benchmark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<f64>,
}

/// Benchmark performance stats combined with valuation metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStats {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub volatility: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to_book: Option<f64>,
}

/// Valuation metrics for a single ticker, from the quote summary endpoint.
///
/// Every field is optional: indices carry no book value, some equities carry
/// no dividend, and the endpoint omits what it does not know.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub ticker: String,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_to_book: Option<f64>,
}

/// One dimension of the index quality score card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub score: u8,
    pub max_score: u8,
    pub description: String,
}

impl Score {
    pub fn new(score: u8, description: &str) -> Self {
        Self {
            score,
            max_score: 10,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCard {
    pub asset_score: Score,
    pub returns_score: Score,
    pub stability_score: Score,
    pub diversification_score: Score,
}
