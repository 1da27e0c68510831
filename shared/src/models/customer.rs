//! Customer Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::{AppError, ErrorCode};

/// Customer entity, unique by email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub customer_id: i64,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Contact info sent with an order or reservation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Contact info after normalization; `email` is the lookup key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedContact {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl CustomerContact {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Trim every field, lowercase the email and check it is present and well formed
    pub fn normalize(&self) -> Result<NormalizedContact, AppError> {
        let email = normalize_email(self.email.as_deref().unwrap_or_default())?;
        Ok(NormalizedContact {
            email,
            name: trimmed(self.name.as_deref()),
            phone: trimmed(self.phone.as_deref()),
        })
    }
}

/// Canonical form of an email used as the customer key
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::new(ErrorCode::CustomerEmailRequired).with_detail("field", "email"));
    }
    if !email.validate_email() {
        return Err(
            AppError::with_message(
                ErrorCode::CustomerEmailInvalid,
                format!("Invalid email address: {email}"),
            )
            .with_detail("field", "email"),
        );
    }
    Ok(email)
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let contact = CustomerContact::new("  Ada@Example.COM ")
            .with_name(" Ada ")
            .with_phone("   ");
        let normalized = contact.normalize().unwrap();
        assert_eq!(normalized.email, "ada@example.com");
        assert_eq!(normalized.name.as_deref(), Some("Ada"));
        assert_eq!(normalized.phone, None);
    }

    #[test]
    fn test_missing_email_is_required() {
        let err = CustomerContact::default().normalize().unwrap_err();
        assert_eq!(err.code, ErrorCode::CustomerEmailRequired);

        let err = CustomerContact::new("   ").normalize().unwrap_err();
        assert_eq!(err.code, ErrorCode::CustomerEmailRequired);
    }

    #[test]
    fn test_malformed_email_rejected() {
        let err = normalize_email("not-an-email").unwrap_err();
        assert_eq!(err.code, ErrorCode::CustomerEmailInvalid);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }
}
