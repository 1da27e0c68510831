//! Current identity (`GET /api/me`, authenticated)

use axum::{Extension, Json, Router, routing::get};
use shared::models::CurrentUser;

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/me", get(me))
}

async fn me(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}
