//! Bistro Client - API client and client-side state for the ordering stack
//!
//! - [`HttpClient`]: typed calls to every API endpoint
//! - [`identity`]: sign-in session against the hosted identity service
//! - [`cart`]: shared shopping cart
//! - [`catalog`]: menu browsing with category and search filters
//! - [`gate`]: role gate for guarded views
//! - [`checkout`]: order + reservation submission

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod identity;

pub use cart::{Cart, CartLine, CartStore};
pub use catalog::MenuCatalog;
pub use checkout::{Checkout, CheckoutForm, CheckoutOutcome, ReservationOutcome};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use gate::{GateDecision, Redirect, RoleState, authorize, resolve_role};
pub use http::{HttpClient, OrderReceipt};
pub use identity::{Auth, HostedIdentity, IdentityBackend, IdentityUser, Session, SessionState};

// Re-export shared types for convenience
pub use shared::{AppError, ErrorBody, ErrorCode};
