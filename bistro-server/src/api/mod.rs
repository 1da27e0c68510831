//! HTTP API
//!
//! | Module | Routes | Access |
//! |--------|--------|--------|
//! | [`health`] | `/health` | public |
//! | [`menu`] | `/api/menu-items` | GET public, POST admin |
//! | [`orders`] | `/api/orders` | POST authenticated, GET/PATCH staff+admin |
//! | [`admin`] | `/api/admin/...` | staff+admin (delete and roles: admin) |
//! | [`reservations`] | `/api/reservations` | POST authenticated, GET staff+admin |
//! | [`directory`] | `/api/customers`, `/api/staff` | staff+admin / admin |
//! | [`me`] | `/api/me` | authenticated |

pub mod admin;
pub mod directory;
pub mod health;
pub mod me;
pub mod menu;
pub mod orders;
pub mod reservations;

use axum::extract::DefaultBodyLimit;
use axum::{Json, Router, middleware};
use http::{HeaderName, HeaderValue, StatusCode};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::{AppState, Config};
use shared::error::AppError;

/// Handler result: JSON body or an [`AppError`] response
pub type ApiResult<T> = Result<Json<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Transport settings of the HTTP layer
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    /// `*` or a single origin
    pub cors_allow_origin: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            cors_allow_origin: "*".to_string(),
        }
    }
}

impl From<&Config> for HttpSettings {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout,
            cors_allow_origin: config.cors_allow_origin.clone(),
        }
    }
}

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin, "Invalid CORS_ALLOW_ORIGIN, allowing any origin");
            CorsLayer::permissive()
        }
    }
}

/// All routes, without middleware or state
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(menu::router())
        .merge(orders::router())
        .merge(admin::router())
        .merge(reservations::router())
        .merge(directory::router())
        .merge(me::router())
}

/// Fully configured application: routes, authentication and tower-http layers
pub fn build_app(state: AppState, settings: &HttpSettings) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // Runs before every route; skips public routes and injects CurrentUser
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            settings.request_timeout,
        ))
        .layer(cors_layer(&settings.cors_allow_origin))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
}
