//! Menu item database operations

use rust_decimal::Decimal;
use shared::models::{MenuItem, MenuItemCreate};
use sqlx::PgPool;
use std::collections::HashMap;

pub async fn list(pool: &PgPool) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as(
        "SELECT item_id, name, price, category, description, image_url
         FROM menu_items ORDER BY name, item_id",
    )
    .fetch_all(pool)
    .await
}

pub async fn create(pool: &PgPool, item: &MenuItemCreate) -> Result<MenuItem, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO menu_items (name, price, category, description, image_url)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING item_id, name, price, category, description, image_url",
    )
    .bind(&item.name)
    .bind(item.price)
    .bind(&item.category)
    .bind(&item.description)
    .bind(&item.image_url)
    .fetch_one(pool)
    .await
}

/// Current prices of the requested items, read in one statement
pub async fn prices(pool: &PgPool, item_ids: &[i64]) -> Result<HashMap<i64, Decimal>, sqlx::Error> {
    let rows: Vec<(i64, Decimal)> =
        sqlx::query_as("SELECT item_id, price FROM menu_items WHERE item_id = ANY($1)")
            .bind(item_ids)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().collect())
}
