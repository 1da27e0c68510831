//! Order domain logic shared by server and client
//!
//! - Money: decimal arithmetic for line and order totals
//! - Status: order status enum and the configurable transition policy
//! - Listing: back-office filter/sort and dashboard stats

pub mod listing;
pub mod money;
pub mod status;

// Re-exports
pub use listing::{OrderListQuery, OrderSort, OrderStats};
pub use money::{MAX_QUANTITY, line_total, money_eq, round_money, sum_lines};
pub use status::{OrderStatus, TransitionPolicy};
