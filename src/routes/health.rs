use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> Json<Value> {
    info!("GET / - Root check");
    Json(json!({ "message": "Promptfolio API is running!" }))
}

async fn health() -> Json<Value> {
    info!("GET /health - Health check");
    Json(json!({
        "status": "healthy",
        "service": "Promptfolio API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
