//! Core: configuration, shared state and the HTTP server
//!
//! - [`Config`] - environment configuration
//! - [`AppState`] - shared state handed to every handler
//! - [`Server`] - binds the listener and serves the router

pub mod config;
pub mod server;
pub mod state;

pub use config::{BoxError, Config, IdentityMode, StoreBackend};
pub use server::Server;
pub use state::AppState;
