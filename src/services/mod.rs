pub mod benchmark;
pub mod composite;
pub mod fund_overlap;
pub mod index_service;
pub mod market_history;
pub mod performance_service;
pub mod rate_limiter;
pub mod sampling;
pub mod stats;
pub mod synthetic;
pub mod validation;
