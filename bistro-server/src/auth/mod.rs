//! Authentication
//!
//! - [`provider`]: identity provider seam
//! - [`hosted`]: remote verification against the hosted auth service
//! - [`jwt`]: local HS256 verification with the provider's JWT secret
//! - [`middleware`]: `require_auth` and the role gate

pub mod hosted;
pub mod jwt;
pub mod middleware;
pub mod provider;

pub use hosted::HostedIdentityProvider;
pub use jwt::{Claims, JwtIdentityProvider};
pub use middleware::{CurrentUserExt, extract_bearer, require_auth, require_roles};
pub use provider::{Identity, IdentityError, IdentityProvider};
pub use shared::models::CurrentUser;
