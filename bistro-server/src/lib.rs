//! Bistro Server - restaurant ordering API
//!
//! ```text
//! bistro-server/src/
//! ├── core/       # config, shared state, HTTP server
//! ├── auth/       # identity providers, auth and role-gate middleware
//! ├── api/        # routes and handlers
//! ├── services/   # pricing, order submission, reservations, back office
//! ├── db/         # store traits, Postgres store, in-memory store
//! └── error.rs    # store and service errors
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod error;
pub mod services;

pub use api::{HttpSettings, build_app};
pub use crate::core::{AppState, Config, Server};
pub use error::StoreError;

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};

/// Security event logging (target `security`)
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
