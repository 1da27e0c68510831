//! Authentication and role-gate middleware
//!
//! [`require_auth`] runs on every request: it verifies the bearer token with
//! the configured identity provider, resolves the caller's role and inserts a
//! [`CurrentUser`] into the request extensions. Route groups then add
//! [`require_roles`] for back-office and admin-only operations.
//!
//! Authentication is always checked before the role, so an anonymous request
//! to an admin route gets 401, never 403.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;
use shared::error::{AppError, ErrorCode};
use shared::models::{CurrentUser, Role};

use crate::core::AppState;
use crate::security_log;

/// Requests that skip authentication
fn is_public(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS || !path.starts_with("/api/") {
        return true;
    }
    method == Method::GET && path == "/api/menu-items"
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authentication middleware
///
/// | Failure | Status |
/// |---------|--------|
/// | no `Authorization` header | 401 NotAuthenticated |
/// | malformed header or rejected token | 401 TokenInvalid |
/// | expired token | 401 TokenExpired |
/// | identity provider unreachable | 503 IdentityProviderError |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    // Owned so no borrow of the request is held across the provider call
    let token = match req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => extract_bearer(header)
            .map(str::to_owned)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().path());
            return Err(AppError::unauthorized());
        }
    };

    let identity = match state.identity.verify(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            let error = e.to_string();
            security_log!(
                "WARN",
                "auth_failed",
                error = error.as_str(),
                uri = req.uri().path()
            );
            return Err(e.into());
        }
    };

    let role = state
        .resolve_role(&identity.user_id, identity.email.as_deref())
        .await?;
    tracing::debug!(user_id = %identity.user_id, role = %role, "Request authenticated");

    req.extensions_mut().insert(CurrentUser {
        user_id: identity.user_id,
        email: identity.email,
        role,
    });
    Ok(next.run(req).await)
}

/// Role gate for a route group
///
/// ```ignore
/// Router::new()
///     .route("/orders", get(handler::list))
///     .layer(middleware::from_fn(require_roles(Role::BACK_OFFICE)));
/// ```
///
/// 401 without an authenticated user, 403 when the role is not in `allowed`
/// (`AdminRequired` for admin-only groups).
pub fn require_roles(
    allowed: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req.current_user()?;

            if !user.role.is_any_of(allowed) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.user_id.as_str(),
                    user_role = user.role.as_str(),
                    uri = req.uri().path()
                );
                let err = if allowed == Role::ADMIN_ONLY {
                    AppError::new(ErrorCode::AdminRequired)
                } else {
                    AppError::forbidden(format!(
                        "Role '{}' may not access this resource",
                        user.role
                    ))
                };
                return Err(err);
            }

            Ok(next.run(req).await)
        })
    }
}

/// Access the authenticated user inserted by [`require_auth`]
pub trait CurrentUserExt {
    /// 401 when the request was not authenticated
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer("bearer   tok "), Some("tok"));
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("Bearer"), None);
    }

    #[test]
    fn test_public_routes() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::GET, "/api/menu-items"));
        assert!(is_public(&Method::OPTIONS, "/api/orders"));
        assert!(!is_public(&Method::POST, "/api/menu-items"));
        assert!(!is_public(&Method::GET, "/api/orders"));
        assert!(!is_public(&Method::GET, "/api/me"));
    }
}
