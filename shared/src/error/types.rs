//! `AppError` and the JSON error body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error carried from a service to the HTTP response, and back out of it in
/// the client
///
/// `details` holds machine-readable context such as the offending `field`,
/// unknown `item_ids`, or the `partial`/`partial_order_id` pair of a failed
/// order write.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Map<String, Value>>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref()?.get(key)
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, message)
    }

    /// `{field} is required`, naming the field in the details
    pub fn required(field: &str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{field} is required"))
            .with_detail("field", field)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, message)
    }

    // Auth and permission

    /// No credential was presented
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, message)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Authenticated, but the role may not do this
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, message)
    }

    // Order writes

    /// A failed order write, stating whether order `order_id` may still exist
    ///
    /// `partial = true` means the row is known or suspected to remain without
    /// its full item and payment set, and is reported as
    /// `OrderPartiallyPersisted`. Otherwise the write was fully undone and the
    /// error is a plain `DatabaseError`.
    pub fn partial_order(order_id: i64, partial: bool, message: impl Into<String>) -> Self {
        let code = if partial {
            ErrorCode::OrderPartiallyPersisted
        } else {
            ErrorCode::DatabaseError
        };
        Self::with_message(code, message)
            .with_detail("partial", partial)
            .with_detail("partial_order_id", order_id)
    }

    pub fn is_partial_order(&self) -> bool {
        self.detail("partial")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// JSON body of every error response: `{ "code", "message", "details"? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl From<ErrorBody> for AppError {
    /// Codes this build does not know become `Unknown`; the message is kept
    fn from(body: ErrorBody) -> Self {
        Self {
            code: ErrorCode::try_from(body.code).unwrap_or(ErrorCode::Unknown),
            message: body.message,
            details: body.details,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System
            || self.code == ErrorCode::OrderPartiallyPersisted
        {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        }
        (self.http_status(), axum::Json(ErrorBody::from(&self))).into_response()
    }
}
