//! Data models
//!
//! Shared between bistro-server and bistro-client (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (Postgres BIGINT identity columns); money is `Decimal`.

pub mod customer;
pub mod identity;
pub mod menu;
pub mod order;
pub mod reservation;
pub mod staff;

// Re-exports
pub use customer::*;
pub use identity::*;
pub use menu::*;
pub use order::*;
pub use reservation::*;
pub use staff::*;
