//! Customer database operations

use shared::models::{Customer, NormalizedContact};
use sqlx::PgPool;

const COLUMNS: &str = "customer_id, name, email, phone, created_at";

/// Single-statement get-or-create keyed by the unique email
///
/// `ON CONFLICT ... DO UPDATE` always returns the row, so concurrent callers
/// converge on one customer without a read-then-insert window.
pub async fn get_or_create(
    pool: &PgPool,
    contact: &NormalizedContact,
) -> Result<Customer, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO customers (email, name, phone)
         VALUES ($1, $2, $3)
         ON CONFLICT (email) DO UPDATE SET
            name = COALESCE(customers.name, EXCLUDED.name),
            phone = COALESCE(customers.phone, EXCLUDED.phone)
         RETURNING {COLUMNS}"
    ))
    .bind(&contact.email)
    .bind(&contact.name)
    .bind(&contact.phone)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, customer_id: i64) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM customers WHERE customer_id = $1"))
        .bind(customer_id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Customer>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM customers ORDER BY name NULLS FIRST, customer_id"
    ))
    .fetch_all(pool)
    .await
}
