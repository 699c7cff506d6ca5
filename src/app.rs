use axum::Router;
use http::{HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::routes::{funds, health, index, portfolio};
use crate::state::AppState;

pub fn create_app(state: AppState, allowed_origins: &str) -> Router {
    Router::<AppState>::new()
        .merge(health::router())
        .merge(index::router())
        .merge(portfolio::router())
        .merge(funds::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(allowed_origins)),
        )
        .with_state(state)
}

/// Browser clients live on a different origin than the API, so CORS is
/// always on. `ALLOWED_ORIGINS="*"` opens it up for local development;
/// a comma-separated list locks it down for deployments.
fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring malformed origin in ALLOWED_ORIGINS: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any)
}
