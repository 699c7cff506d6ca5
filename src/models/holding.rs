use serde::{Deserialize, Serialize};

use crate::models::performance::{BenchmarkStats, PerformanceData, PerformanceStats, ScoreCard};

/// A single constituent of a generated index.
///
/// Weights are expressed in percent; a valid portfolio's weights sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub security_name: String,
    pub country: String,
    pub sector: String,
    pub market_cap: String,
    pub relevance: String,
    pub selection_rationale: String,
    pub weight: f64,
}

/// Request body for index generation.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexRequest {
    pub prompt: String,
}

/// Full response for a generated index: holdings plus computed analytics.
#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub index_name: String,
    pub original_prompt: String,
    pub holdings: Vec<Holding>,
    pub performance_data: PerformanceData,
    pub stats: PerformanceStats,
    pub benchmark_stats: BenchmarkStats,
    pub scores: ScoreCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateHoldingsResponse {
    pub message: String,
    pub holdings: Vec<Holding>,
}
