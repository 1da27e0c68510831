//! Catalog administration, customer/staff listings and role management

use shared::error::AppError;
use shared::models::{
    Customer, MenuItem, MenuItemCreate, MenuQuery, Role, RoleAssignment, Staff, normalize_email,
};
use shared::request::RoleAssignmentRequest;

use crate::db::{RoleUpsert, Store};

/// Catalog filtered by category and search text, sorted by name
pub async fn list_menu(store: &dyn Store, query: &MenuQuery) -> Result<Vec<MenuItem>, AppError> {
    let items = store.list_menu_items().await?;
    Ok(query.apply(&items).into_iter().cloned().collect())
}

pub async fn create_menu_item(
    store: &dyn Store,
    item: MenuItemCreate,
) -> Result<MenuItem, AppError> {
    let item = item.normalized()?;
    let created = store.create_menu_item(&item).await?;
    tracing::info!(item_id = created.item_id, name = %created.name, "Menu item created");
    Ok(created)
}

pub async fn list_customers(store: &dyn Store) -> Result<Vec<Customer>, AppError> {
    Ok(store.list_customers().await?)
}

pub async fn list_staff(store: &dyn Store) -> Result<Vec<Staff>, AppError> {
    Ok(store.list_staff().await?)
}

/// Assign a role to a user id, or to an email whose user id is not known yet
pub async fn assign_role(
    store: &dyn Store,
    req: RoleAssignmentRequest,
) -> Result<RoleAssignment, AppError> {
    let role: Role = req
        .role
        .as_deref()
        .ok_or_else(|| AppError::required("role"))?
        .parse()?;
    let user_id = req
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    let email = req
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(normalize_email)
        .transpose()?;

    if user_id.is_none() && email.is_none() {
        return Err(
            AppError::validation("email or user_id is required").with_detail("field", "email"),
        );
    }

    let assignment = store
        .upsert_role_assignment(&RoleUpsert {
            user_id,
            email,
            role,
        })
        .await?;
    tracing::info!(
        assignment_id = assignment.assignment_id,
        role = %assignment.role,
        "Role assigned"
    );
    Ok(assignment)
}
