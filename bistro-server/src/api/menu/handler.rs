//! Menu API handlers

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use shared::models::{MenuItem, MenuItemCreate, MenuQuery};

use crate::api::ApiResult;
use crate::core::AppState;
use crate::services::directory;
use shared::error::AppError;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Vec<MenuItem>> {
    let items = directory::list_menu(state.store.as_ref(), &query).await?;
    Ok(Json(items))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<MenuItemCreate>,
) -> Result<(StatusCode, Json<MenuItem>), AppError> {
    let item = directory::create_menu_item(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}
