//! Client error types
//!
//! Every variant renders a message fit to show to the user.

use shared::error::{AppError, ErrorCategory, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or timeout
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Structured error returned by the API server
    #[error("{}", .0.message)]
    Api(AppError),

    /// The hosted identity service rejected the request
    #[error("Sign-in failed: {0}")]
    Identity(String),

    /// An operation needs a signed-in user
    #[error("Please sign in to continue")]
    NotSignedIn,

    #[error("Add at least one item to order")]
    EmptyCart,

    /// A checkout is already being submitted
    #[error("An order is already being submitted")]
    SubmissionInFlight,

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Error code when the server sent one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api(e) => Some(e.code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::NotSignedIn)
            || matches!(self.code().map(|c| c.category()), Some(ErrorCategory::Auth))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self.code().map(|c| c.category()), Some(ErrorCategory::Permission))
    }

    /// Whether the server reported that an order row may remain half-written
    pub fn is_partial_order(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_partial_order())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_is_server_message() {
        let err = ClientError::Api(AppError::new(ErrorCode::OrderEmpty));
        assert_eq!(err.to_string(), "Order must contain at least one item");
        assert_eq!(err.code(), Some(ErrorCode::OrderEmpty));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_error_classes() {
        assert!(ClientError::NotSignedIn.is_unauthorized());
        assert!(ClientError::Api(AppError::token_expired()).is_unauthorized());
        assert!(ClientError::Api(AppError::new(ErrorCode::AdminRequired)).is_forbidden());
        assert!(ClientError::Api(AppError::partial_order(3, true, "half")).is_partial_order());
        assert!(!ClientError::EmptyCart.is_partial_order());
    }
}
