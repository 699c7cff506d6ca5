use axum::routing::put;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{Holding, UpdateHoldingsResponse};
use crate::services::validation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/update-holdings", put(update_holdings))
}

async fn update_holdings(
    Json(holdings): Json<Vec<Holding>>,
) -> Result<Json<UpdateHoldingsResponse>, AppError> {
    info!("PUT /update-holdings - {} holdings", holdings.len());

    for holding in &holdings {
        validation::validate_holding(holding)?;
    }
    validation::validate_holdings_weights(&holdings)?;

    Ok(Json(UpdateHoldingsResponse {
        message: "Holdings updated successfully".to_string(),
        holdings,
    }))
}
