//! Staff directory and role assignment database operations

use shared::models::{Role, RoleAssignment, Staff};
use sqlx::PgPool;

use crate::db::RoleUpsert;

const ASSIGNMENT_COLUMNS: &str = "assignment_id, user_id, email, role, updated_at";

pub async fn list_staff(pool: &PgPool) -> Result<Vec<Staff>, sqlx::Error> {
    sqlx::query_as(
        "SELECT staff_id, name, email, phone, position, hired_at
         FROM staff ORDER BY hired_at DESC, staff_id DESC",
    )
    .fetch_all(pool)
    .await
}

/// Upsert keyed by user id
pub async fn upsert_by_user(
    pool: &PgPool,
    user_id: &str,
    email: Option<&str>,
    role: Role,
) -> Result<RoleAssignment, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO role_assignments (user_id, email, role)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id) WHERE user_id IS NOT NULL DO UPDATE SET
            role = EXCLUDED.role,
            email = COALESCE(EXCLUDED.email, role_assignments.email),
            updated_at = now()
         RETURNING {ASSIGNMENT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await
}

/// Upsert keyed by email, for identities whose user id is not known yet
pub async fn upsert_by_email(
    pool: &PgPool,
    email: &str,
    role: Role,
) -> Result<RoleAssignment, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO role_assignments (user_id, email, role)
         VALUES (NULL, $1, $2)
         ON CONFLICT (email) WHERE user_id IS NULL DO UPDATE SET
            role = EXCLUDED.role,
            updated_at = now()
         RETURNING {ASSIGNMENT_COLUMNS}"
    ))
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await
}

pub async fn upsert(pool: &PgPool, upsert: &RoleUpsert) -> Result<RoleAssignment, sqlx::Error> {
    match (&upsert.user_id, &upsert.email) {
        (Some(user_id), email) => {
            upsert_by_user(pool, user_id, email.as_deref(), upsert.role).await
        }
        (None, Some(email)) => upsert_by_email(pool, email, upsert.role).await,
        (None, None) => Err(sqlx::Error::Protocol(
            "role assignment needs a user id or an email".into(),
        )),
    }
}

/// Role by user id, falling back to the newest assignment for the email
pub async fn find_role(
    pool: &PgPool,
    user_id: &str,
    email: Option<&str>,
) -> Result<Option<Role>, sqlx::Error> {
    let row: Option<(Role,)> = sqlx::query_as(
        "SELECT role FROM role_assignments
         WHERE user_id = $1 OR ($2::text IS NOT NULL AND email = $2)
         ORDER BY (user_id = $1) DESC NULLS LAST, updated_at DESC
         LIMIT 1",
    )
    .bind(user_id)
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(role,)| role))
}
