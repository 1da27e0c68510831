//! Reservation API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/reservations | POST | authenticated |
//! | /api/reservations | GET | staff, admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::models::Role;

use crate::auth::require_roles;
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<AppState> {
    let submit = Router::new().route("/", post(handler::create));

    let back_office = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_roles(Role::BACK_OFFICE)));

    submit.merge(back_office)
}
