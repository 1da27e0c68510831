//! Health check (public)

use axum::{Json, Router, routing::get};
use shared::response::HealthResponse;

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
