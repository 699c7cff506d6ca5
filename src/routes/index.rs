use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{Holding, IndexRequest, IndexResponse, PerformanceResponse};
use crate::services::performance_service;
use crate::state::AppState;

/// Horizon used for the initial generate-index response.
const DEFAULT_MONTHS: u32 = 12;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-index", post(generate_index))
        .route("/performance-data", post(performance_data))
}

async fn generate_index(
    State(state): State<AppState>,
    Json(request): Json<IndexRequest>,
) -> Result<Json<IndexResponse>, AppError> {
    info!("POST /generate-index - prompt: {:.100}", request.prompt);

    let portfolio = state.index.generate(&request.prompt).await?;

    let performance_data = performance_service::compute_performance(
        &state.history,
        &portfolio.holdings,
        DEFAULT_MONTHS,
    )
    .await;
    let stats = performance_service::compute_stats(&performance_data, state.risk_free_rate);
    let benchmark_stats = performance_service::compute_benchmark_stats(
        &state.history,
        &performance_data,
        state.risk_free_rate,
    )
    .await;
    let scores = performance_service::generate_scores();

    info!("Index generation completed for \"{}\"", portfolio.index_name);

    Ok(Json(IndexResponse {
        index_name: portfolio.index_name,
        original_prompt: request.prompt,
        holdings: portfolio.holdings,
        performance_data,
        stats,
        benchmark_stats,
        scores,
    }))
}

#[derive(Debug, Deserialize)]
struct PerformanceQuery {
    months: Option<u32>,
}

async fn performance_data(
    State(state): State<AppState>,
    Query(params): Query<PerformanceQuery>,
    Json(holdings): Json<Vec<Holding>>,
) -> Result<Json<PerformanceResponse>, AppError> {
    let months = params.months.unwrap_or(DEFAULT_MONTHS);
    if !(1..=120).contains(&months) {
        return Err(AppError::Validation(format!(
            "months must be between 1 and 120, got {months}"
        )));
    }

    info!(
        "POST /performance-data - {} holdings over {} months",
        holdings.len(),
        months
    );

    let performance_data =
        performance_service::compute_performance(&state.history, &holdings, months).await;
    let stats = performance_service::compute_stats(&performance_data, state.risk_free_rate);
    let benchmark_stats = performance_service::compute_benchmark_stats(
        &state.history,
        &performance_data,
        state.risk_free_rate,
    )
    .await;

    Ok(Json(PerformanceResponse {
        performance_data,
        stats,
        benchmark_stats,
    }))
}
