//! Order, order item and payment database operations
//!
//! Write functions take any executor so they run both on the pool and inside
//! the order transaction.

use rust_decimal::Decimal;
use shared::models::{Order, OrderDetail, OrderItem, Payment, PaymentMethod};
use shared::order::OrderStatus;
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;

use crate::db::{IdempotencyKey, NewOrder, OrderLine};

const ORDER_COLUMNS: &str =
    "order_id, customer_id, order_date, total_amount, status, idempotency_key";

pub async fn find_by_id(pool: &PgPool, order_id: i64) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"))
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

/// Order created under `key`, with its items and payments
pub async fn find_by_idempotency_key(
    pool: &PgPool,
    key: &IdempotencyKey,
) -> Result<Option<OrderDetail>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders
         WHERE idempotency_owner = $1 AND idempotency_key = $2"
    ))
    .bind(&key.owner)
    .bind(&key.key)
    .fetch_optional(pool)
    .await?;

    match order {
        Some(order) => Ok(with_details(pool, vec![order]).await?.pop()),
        None => Ok(None),
    }
}

/// All orders, newest first, each with its items and payments
pub async fn list_with_details(pool: &PgPool) -> Result<Vec<OrderDetail>, sqlx::Error> {
    let orders: Vec<Order> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_date DESC, order_id DESC"
    ))
    .fetch_all(pool)
    .await?;
    with_details(pool, orders).await
}

/// Attach items and payments, keeping the order of `orders`
async fn with_details(
    pool: &PgPool,
    orders: Vec<Order>,
) -> Result<Vec<OrderDetail>, sqlx::Error> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<i64> = orders.iter().map(|o| o.order_id).collect();

    let items: Vec<OrderItem> = sqlx::query_as(
        "SELECT order_item_id, order_id, item_id, quantity
         FROM order_items WHERE order_id = ANY($1) ORDER BY order_item_id",
    )
    .bind(&order_ids)
    .fetch_all(pool)
    .await?;

    let payments: Vec<Payment> = sqlx::query_as(
        "SELECT payment_id, order_id, amount, payment_method, payment_status
         FROM payments WHERE order_id = ANY($1) ORDER BY payment_id",
    )
    .bind(&order_ids)
    .fetch_all(pool)
    .await?;

    let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        items_by_order.entry(item.order_id).or_default().push(item);
    }
    let mut payments_by_order: HashMap<i64, Vec<Payment>> = HashMap::new();
    for payment in payments {
        payments_by_order
            .entry(payment.order_id)
            .or_default()
            .push(payment);
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderDetail {
            order_items: items_by_order.remove(&order.order_id).unwrap_or_default(),
            payments: payments_by_order.remove(&order.order_id).unwrap_or_default(),
            order,
        })
        .collect())
}

pub async fn insert_order<'e>(
    executor: impl PgExecutor<'e>,
    order: &NewOrder,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO orders (customer_id, total_amount, status, idempotency_owner, idempotency_key)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order.customer_id)
    .bind(order.total_amount)
    .bind(OrderStatus::Pending)
    .bind(order.idempotency_key.as_ref().map(|k| k.owner.as_str()))
    .bind(order.idempotency_key.as_ref().map(|k| k.key.as_str()))
    .fetch_one(executor)
    .await
}

/// Insert all lines in one statement
pub async fn insert_items<'e>(
    executor: impl PgExecutor<'e>,
    order_id: i64,
    lines: &[OrderLine],
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let order_ids: Vec<i64> = lines.iter().map(|_| order_id).collect();
    let item_ids: Vec<i64> = lines.iter().map(|l| l.item_id).collect();
    let quantities: Vec<i32> = lines.iter().map(|l| l.quantity).collect();

    sqlx::query_as(
        "INSERT INTO order_items (order_id, item_id, quantity)
         SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::integer[])
         RETURNING order_item_id, order_id, item_id, quantity",
    )
    .bind(&order_ids)
    .bind(&item_ids)
    .bind(&quantities)
    .fetch_all(executor)
    .await
}

pub async fn insert_payment<'e>(
    executor: impl PgExecutor<'e>,
    order_id: i64,
    amount: Decimal,
    method: PaymentMethod,
) -> Result<Payment, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO payments (order_id, amount, payment_method)
         VALUES ($1, $2, $3)
         RETURNING payment_id, order_id, amount, payment_method, payment_status",
    )
    .bind(order_id)
    .bind(amount)
    .bind(method)
    .fetch_one(executor)
    .await
}

/// Compare-and-set status update
pub async fn update_status(
    pool: &PgPool,
    order_id: i64,
    expected: OrderStatus,
    status: OrderStatus,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE orders SET status = $3
         WHERE order_id = $1 AND status = $2
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order_id)
    .bind(expected)
    .bind(status)
    .fetch_optional(pool)
    .await
}

/// Items and payments go with the order (`ON DELETE CASCADE`)
pub async fn delete(pool: &PgPool, order_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
        .bind(order_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
