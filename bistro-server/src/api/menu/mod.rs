//! Menu catalog API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/menu-items | GET | public (`?category=&q=`) |
//! | /api/menu-items | POST | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::models::Role;

use crate::auth::require_roles;
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/menu-items", routes())
}

fn routes() -> Router<AppState> {
    let read = Router::new().route("/", get(handler::list));

    let manage = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_roles(Role::ADMIN_ONLY)));

    read.merge(manage)
}
