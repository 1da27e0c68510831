//! Server configuration
//!
//! Read from environment variables (a `.env` file is loaded by `main`).
//! Secrets must be set outside `development`.

use shared::order::TransitionPolicy;
use std::time::Duration;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where orders, customers and the catalog live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local store, for development and tests
    Memory,
}

/// How bearer tokens are verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityMode {
    /// Ask the hosted auth service for every request
    Hosted { url: String, api_key: String },
    /// Verify HS256 tokens locally with the provider's JWT secret
    LocalJwt { secret: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// development | staging | production
    pub environment: String,
    pub http_port: u16,
    pub store_backend: StoreBackend,
    /// PostgreSQL connection URL (required for the postgres backend)
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub identity: IdentityMode,
    pub identity_timeout: Duration,
    pub request_timeout: Duration,
    pub transitions: TransitionPolicy,
    /// `*` or a single origin
    pub cors_allow_origin: String,
    /// Emails treated as admin regardless of stored role assignments
    pub bootstrap_admin_emails: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let store_backend = match var("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(format!("unknown STORE_BACKEND: {other}").into()),
        };
        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err("DATABASE_URL must be set for the postgres backend".into());
        }

        let identity = match var("IDENTITY_JWT_SECRET") {
            Some(secret) => IdentityMode::LocalJwt { secret },
            None => IdentityMode::Hosted {
                url: var("IDENTITY_URL").ok_or("IDENTITY_URL or IDENTITY_JWT_SECRET must be set")?,
                api_key: require_secret(var("IDENTITY_API_KEY"), "IDENTITY_API_KEY", &environment)?,
            },
        };

        let transitions = match var("ORDER_STATUS_TRANSITIONS") {
            Some(policy) => TransitionPolicy::parse(&policy)?,
            None => TransitionPolicy::any(),
        };

        Ok(Self {
            http_port: parse_or(var("HTTP_PORT"), "HTTP_PORT", 4000)?,
            store_backend,
            database_url,
            database_max_connections: parse_or(
                var("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                10,
            )?,
            database_acquire_timeout: Duration::from_secs(parse_or(
                var("DATABASE_ACQUIRE_TIMEOUT_SECS"),
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                5,
            )?),
            identity,
            identity_timeout: Duration::from_secs(parse_or(
                var("IDENTITY_TIMEOUT_SECS"),
                "IDENTITY_TIMEOUT_SECS",
                5,
            )?),
            request_timeout: Duration::from_secs(parse_or(
                var("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                15,
            )?),
            transitions,
            cors_allow_origin: var("CORS_ALLOW_ORIGIN").unwrap_or_else(|| "*".into()),
            bootstrap_admin_emails: var("BOOTSTRAP_ADMIN_EMAILS")
                .map(|list| {
                    list.split(',')
                        .map(|e| e.trim().to_lowercase())
                        .filter(|e| !e.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// A secret must be set and non-empty outside development
fn require_secret(
    value: Option<String>,
    name: &str,
    environment: &str,
) -> Result<String, BoxError> {
    match value {
        Some(v) => Ok(v),
        None if environment == "development" => Ok(format!("dev-{name}-not-for-production")),
        None => Err(format!("{name} must be set in {environment} environment").into()),
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &str,
    default: T,
) -> Result<T, BoxError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| BoxError::from(format!("{name} has an invalid value: {v}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, BoxError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_with_local_jwt() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("IDENTITY_JWT_SECRET", "secret"),
        ])
        .unwrap();
        assert_eq!(config.http_port, 4000);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.is_development());
        assert_eq!(
            config.identity,
            IdentityMode::LocalJwt {
                secret: "secret".into()
            }
        );
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert!(config.transitions.allows(OrderStatus::Completed, OrderStatus::Pending));
        assert_eq!(config.cors_allow_origin, "*");
    }

    #[test]
    fn test_postgres_requires_database_url() {
        assert!(load(&[("IDENTITY_JWT_SECRET", "s")]).is_err());
        let config = load(&[
            ("IDENTITY_JWT_SECRET", "s"),
            ("DATABASE_URL", "postgres://localhost/bistro"),
        ])
        .unwrap();
        assert_eq!(config.store_backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_hosted_identity_needs_api_key_in_production() {
        let base = [
            ("STORE_BACKEND", "memory"),
            ("IDENTITY_URL", "https://auth.example.com"),
        ];
        assert!(load(&[base[0], base[1], ("ENVIRONMENT", "production")]).is_err());

        let dev = load(&base).unwrap();
        assert!(matches!(dev.identity, IdentityMode::Hosted { .. }));

        let prod = load(&[
            base[0],
            base[1],
            ("ENVIRONMENT", "production"),
            ("IDENTITY_API_KEY", "anon-key"),
        ])
        .unwrap();
        assert_eq!(
            prod.identity,
            IdentityMode::Hosted {
                url: "https://auth.example.com".into(),
                api_key: "anon-key".into()
            }
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let base = [("STORE_BACKEND", "memory"), ("IDENTITY_JWT_SECRET", "s")];
        assert!(load(&[base[0], base[1], ("HTTP_PORT", "eighty")]).is_err());
        assert!(load(&[("STORE_BACKEND", "redis"), base[1]]).is_err());
        assert!(load(&[base[0], base[1], ("ORDER_STATUS_TRANSITIONS", "pending=bogus")]).is_err());
    }

    #[test]
    fn test_transition_and_admin_lists() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("IDENTITY_JWT_SECRET", "s"),
            ("ORDER_STATUS_TRANSITIONS", "lifecycle"),
            ("BOOTSTRAP_ADMIN_EMAILS", " Owner@Example.com, ,ops@example.com"),
        ])
        .unwrap();
        assert!(!config.transitions.allows(OrderStatus::Cancelled, OrderStatus::Pending));
        assert_eq!(
            config.bootstrap_admin_emails,
            vec!["owner@example.com".to_string(), "ops@example.com".to_string()]
        );
    }
}
