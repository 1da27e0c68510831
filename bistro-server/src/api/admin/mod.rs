//! Admin API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/admin/orders/stats | GET | staff, admin |
//! | /api/admin/orders/{id}/status | PATCH | staff, admin |
//! | /api/admin/orders/{id} | DELETE | admin (`?confirm=true`) |
//! | /api/admin/users/role | POST | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use shared::models::Role;

use super::orders::handler as orders;
use crate::auth::require_roles;
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<AppState> {
    let back_office = Router::new()
        .route("/orders/stats", get(orders::stats))
        .route("/orders/{id}/status", patch(orders::update_status))
        .layer(middleware::from_fn(require_roles(Role::BACK_OFFICE)));

    let admin_only = Router::new()
        .route("/orders/{id}", delete(handler::delete_order))
        .route("/users/role", post(handler::assign_role))
        .layer(middleware::from_fn(require_roles(Role::ADMIN_ONLY)));

    back_office.merge(admin_only)
}
