//! Order API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/orders | POST | authenticated (`Idempotency-Key` header optional) |
//! | /api/orders | GET | staff, admin (`?status=&sort=newest\|highest_price\|highest_sold`) |
//! | /api/orders/{id}/status | PATCH | staff, admin |

pub(crate) mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use shared::models::Role;

use crate::auth::require_roles;
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    let submit = Router::new().route("/", post(handler::create));

    let back_office = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_roles(Role::BACK_OFFICE)));

    submit.merge(back_office)
}
