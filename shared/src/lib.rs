//! Shared types for the Bistro ordering stack
//!
//! Common types used by both the API server and the client including
//! domain models, request/response bodies, order money and status logic,
//! and the unified error system.

pub mod error;
pub mod models;
pub mod order;
pub mod request;
pub mod response;

// Re-exports
pub use error::{AppError, AppResult, ErrorBody, ErrorCode};
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};
