use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use reqwest::StatusCode;
use thiserror::Error;

use crate::external::holdings_generator::GeneratorError;
use crate::external::market_data::MarketDataError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (StatusCode::TOO_MANY_REQUESTS, headers, "Rate limited").into_response()
            }
            AppError::External(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
        }
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

impl From<GeneratorError> for AppError {
    fn from(value: GeneratorError) -> Self {
        match value {
            GeneratorError::RateLimited => AppError::RateLimited,
            other => AppError::External(other.to_string()),
        }
    }
}

impl From<MarketDataError> for AppError {
    fn from(value: MarketDataError) -> Self {
        match value {
            MarketDataError::RateLimited => AppError::RateLimited,
            MarketDataError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::External(other.to_string()),
        }
    }
}
