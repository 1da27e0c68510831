//! Error system shared by the server and the client
//!
//! Services return [`AppError`]; axum turns it into an [`ErrorBody`] with the
//! status from [`ErrorCode::http_status`]. The client parses the same body back
//! into an `AppError`, so both sides match on [`ErrorCode`] rather than on
//! message text.
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::validation("party_size must be between 1 and 50")
//!     .with_detail("field", "party_size");
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, ErrorCode::ValidationFailed.code());
//! assert_eq!(AppError::from(body), err);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
