use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{FundOverlapParams, FundOverlapReport};
use crate::services::fund_overlap::MIN_EXPOSURE_DEFAULT;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/fund-overlap", get(fund_overlap))
}

/// GET /fund-overlap?tickers=HDFCBANK.NS,RELIANCE.NS&min_exposure=0.5
async fn fund_overlap(
    State(state): State<AppState>,
    Query(params): Query<FundOverlapParams>,
) -> Result<Json<FundOverlapReport>, AppError> {
    let tickers = params.ticker_list();
    info!("GET /fund-overlap - {} tickers", tickers.len());

    if tickers.is_empty() {
        return Err(AppError::Validation(
            "At least one ticker is required".to_string(),
        ));
    }

    let min_exposure = params.min_exposure.unwrap_or(MIN_EXPOSURE_DEFAULT);
    let report = state.funds.map_tickers_to_funds(&tickers, min_exposure);

    Ok(Json(report))
}
