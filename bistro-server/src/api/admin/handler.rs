//! Admin API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::RoleAssignment;
use shared::request::{DeleteOrderQuery, RoleAssignmentRequest};
use shared::response::DeletedResponse;

use crate::api::ApiResult;
use crate::core::AppState;
use crate::services::{directory, order_admin};

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DeleteOrderQuery>,
) -> ApiResult<DeletedResponse> {
    order_admin::delete_order(state.store.as_ref(), id, query.confirm).await?;
    Ok(Json(DeletedResponse {
        order_id: id,
        deleted: true,
    }))
}

pub async fn assign_role(
    State(state): State<AppState>,
    Json(payload): Json<RoleAssignmentRequest>,
) -> ApiResult<RoleAssignment> {
    let assignment = directory::assign_role(state.store.as_ref(), payload).await?;
    Ok(Json(assignment))
}
