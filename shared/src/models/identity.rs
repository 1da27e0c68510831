//! Identity and Role Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};

/// Application role, resolved after authentication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum Role {
    #[default]
    Customer,
    Staff,
    Admin,
    Courier,
}

impl Role {
    /// Roles allowed to run the back office (order list, status changes)
    pub const BACK_OFFICE: &'static [Role] = &[Role::Admin, Role::Staff];
    /// Roles allowed to delete orders and manage roles
    pub const ADMIN_ONLY: &'static [Role] = &[Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
            Self::Courier => "courier",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role is one of `allowed`
    pub fn is_any_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            "courier" => Ok(Self::Courier),
            other => Err(AppError::with_message(
                ErrorCode::RoleInvalid,
                format!("Unknown role: {other}"),
            )),
        }
    }
}

/// Authenticated identity as seen by handlers and returned by `/api/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity provider user id (`sub`)
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Stored role assignment, keyed by user id or (when the id is unknown) by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RoleAssignment {
    pub assignment_id: i64,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("courier".parse::<Role>().unwrap(), Role::Courier);
        assert_eq!("owner".parse::<Role>().unwrap_err().code, ErrorCode::RoleInvalid);
    }

    #[test]
    fn test_role_sets() {
        assert!(Role::Staff.is_any_of(Role::BACK_OFFICE));
        assert!(!Role::Staff.is_any_of(Role::ADMIN_ONLY));
        assert!(!Role::Courier.is_any_of(Role::BACK_OFFICE));
        assert_eq!(Role::default(), Role::Customer);
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
        let user: CurrentUser =
            serde_json::from_str(r#"{"user_id":"u1","email":null,"role":"admin"}"#).unwrap();
        assert!(user.is_admin());
    }
}
