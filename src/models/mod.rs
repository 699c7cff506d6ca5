mod fund;
mod holding;
mod performance;
mod price;

pub use fund::{
    FundOverlap, FundOverlapParams, FundOverlapReport, FundOverlapSummary, OverlappingHolding,
};
pub use holding::{Holding, IndexRequest, IndexResponse, UpdateHoldingsResponse};
pub use performance::{
    BenchmarkStats, FinancialMetrics, PerformanceData, PerformanceResponse, PerformanceStats,
    Score, ScoreCard, SeriesOrigin,
};
pub use price::{FetchInterval, PricePoint};
