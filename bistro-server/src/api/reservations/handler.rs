//! Reservation API handlers

use axum::{Json, extract::State, http::StatusCode};
use shared::error::AppError;
use shared::models::{Reservation, ReservationWithCustomer};
use shared::request::ReservationRequest;

use crate::api::ApiResult;
use crate::core::AppState;
use crate::services::reservations;

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation = reservations::submit_reservation(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ReservationWithCustomer>> {
    let list = reservations::list_reservations(state.store.as_ref()).await?;
    Ok(Json(list))
}
