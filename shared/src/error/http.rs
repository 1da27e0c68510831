//! HTTP status of each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Status the API answers with
    ///
    /// Anything not listed is a client-side validation failure (400). An
    /// unknown menu item is 400 as well: the cart is invalid, the route exists.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::PermissionDenied | Self::AdminRequired => StatusCode::FORBIDDEN,
            Self::NotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists | Self::OrderTransitionNotAllowed => StatusCode::CONFLICT,
            Self::IdentityProviderError => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::OrderPartiallyPersisted => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_before_permission() {
        for code in [
            ErrorCode::NotAuthenticated,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
        ] {
            assert_eq!(code.http_status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(ErrorCode::AdminRequired.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_order_statuses() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::OrderTransitionNotAllowed.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::OrderPartiallyPersisted.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MenuItemNotFound.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_codes_are_bad_request() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::RequiredField,
            ErrorCode::ConfirmationRequired,
            ErrorCode::PartySizeInvalid,
            ErrorCode::CustomerEmailRequired,
        ] {
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST, "{code:?}");
        }
    }

    #[test]
    fn test_identity_outage_is_retryable() {
        assert_eq!(
            ErrorCode::IdentityProviderError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
