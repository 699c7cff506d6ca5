use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Represents a historical close for a given ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Granularity of a historical fetch.
///
/// Chosen per request by the sampling policy; part of the history cache key
/// so daily and weekly series for the same window never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchInterval {
    Daily,
    Weekly,
}

impl FetchInterval {
    /// Wire value understood by the chart API ("1d" / "1wk").
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchInterval::Daily => "1d",
            FetchInterval::Weekly => "1wk",
        }
    }
}
