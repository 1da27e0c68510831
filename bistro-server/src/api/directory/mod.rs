//! Customer and staff directory
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/customers | GET | staff, admin |
//! | /api/staff | GET | admin |

use axum::{Json, Router, extract::State, middleware, routing::get};
use shared::models::{Customer, Role, Staff};

use crate::api::ApiResult;
use crate::auth::require_roles;
use crate::core::AppState;
use crate::services::directory;

pub fn router() -> Router<AppState> {
    let customers = Router::new()
        .route("/api/customers", get(list_customers))
        .layer(middleware::from_fn(require_roles(Role::BACK_OFFICE)));

    let staff = Router::new()
        .route("/api/staff", get(list_staff))
        .layer(middleware::from_fn(require_roles(Role::ADMIN_ONLY)));

    customers.merge(staff)
}

async fn list_customers(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    Ok(Json(directory::list_customers(state.store.as_ref()).await?))
}

async fn list_staff(State(state): State<AppState>) -> ApiResult<Vec<Staff>> {
    Ok(Json(directory::list_staff(state.store.as_ref()).await?))
}
