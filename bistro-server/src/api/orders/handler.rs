//! Order API handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use shared::error::AppError;
use shared::models::{CurrentUser, Order, OrderDetail};
use shared::order::{OrderListQuery, OrderStats};
use shared::request::{IDEMPOTENCY_KEY_HEADER, SubmitOrderRequest, UpdateStatusRequest};
use shared::response::OrderCreatedResponse;

use crate::api::ApiResult;
use crate::core::AppState;
use crate::services::{order_admin, submit_order};

fn idempotency_key(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .map(|v| {
            v.to_str()
                .map(str::to_owned)
                .map_err(|_| AppError::invalid_request("Idempotency-Key must be visible ASCII"))
        })
        .transpose()
}

/// 201 for a new order, 200 when an idempotent replay returns the original
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<SubmitOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), AppError> {
    let key = idempotency_key(&headers)?;
    let submitted = submit_order(state.store.as_ref(), &user.user_id, payload, key).await?;
    let status = if submitted.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(OrderCreatedResponse::from(submitted.order))))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Vec<OrderDetail>> {
    let orders = order_admin::list_orders(state.store.as_ref(), &query).await?;
    Ok(Json(orders))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Order> {
    let order =
        order_admin::set_status(state.store.as_ref(), &state.transitions, id, &payload).await?;
    Ok(Json(order))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<OrderStats> {
    let stats = order_admin::order_stats(state.store.as_ref()).await?;
    Ok(Json(stats))
}
