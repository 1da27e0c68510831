//! Business services
//!
//! Handlers stay thin: they extract the request, call one service function
//! with `&dyn Store` and return its result.

pub mod customers;
pub mod directory;
pub mod order_admin;
pub mod orders;
pub mod pricing;
pub mod reservations;

pub use customers::CustomerRef;
pub use orders::{SubmittedOrder, submit_order};
pub use pricing::{PricedCart, price_cart};
pub use reservations::submit_reservation;
