//! Identity provider seam
//!
//! Bearer tokens are validated on every request against an
//! [`IdentityProvider`]; no session is kept server-side.

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Identity established from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider user id (`sub`)
    pub user_id: String,
    pub email: Option<String>,
}

/// Identity verification failure
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    ExpiredToken,
    /// Provider could not be reached or answered unexpectedly
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidToken(_) => AppError::invalid_token("Invalid token"),
            IdentityError::ExpiredToken => AppError::token_expired(),
            IdentityError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Identity provider unavailable");
                AppError::new(ErrorCode::IdentityProviderError)
            }
        }
    }
}

/// Validates bearer tokens
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_identity_errors_map_to_auth_codes() {
        let err: AppError = IdentityError::InvalidToken("bad".into()).into();
        assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);

        let err: AppError = IdentityError::ExpiredToken.into();
        assert_eq!(err.code, ErrorCode::TokenExpired);

        let err: AppError = IdentityError::Unavailable("timeout".into()).into();
        assert_eq!(err.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
