//! Application state shared by all handlers

use shared::error::AppError;
use shared::models::Role;
use shared::order::TransitionPolicy;
use std::collections::HashSet;
use std::sync::Arc;

use super::config::{BoxError, Config, IdentityMode, StoreBackend};
use crate::auth::{HostedIdentityProvider, IdentityProvider, JwtIdentityProvider};
use crate::db::{MemoryStore, PgStore, Store};

/// Shared application state
///
/// | Field | Purpose |
/// |-------|---------|
/// | store | persistence backend (Postgres or in-memory) |
/// | identity | bearer token verification |
/// | transitions | allowed order status changes |
/// | bootstrap_admins | lower-cased emails always resolved as admin |
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub transitions: Arc<TransitionPolicy>,
    pub bootstrap_admins: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            transitions: Arc::new(TransitionPolicy::any()),
            bootstrap_admins: Arc::new(HashSet::new()),
        }
    }

    pub fn with_transitions(mut self, transitions: TransitionPolicy) -> Self {
        self.transitions = Arc::new(transitions);
        self
    }

    pub fn with_bootstrap_admins<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.bootstrap_admins = Arc::new(
            emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .collect(),
        );
        self
    }

    /// Build the store and identity provider described by `config`
    pub async fn from_config(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn Store> = match config.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or("DATABASE_URL must be set for the postgres backend")?;
                let store = PgStore::connect(
                    url,
                    config.database_max_connections,
                    config.database_acquire_timeout,
                )
                .await?;
                tracing::info!("Connected to PostgreSQL");
                Arc::new(store)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                if config.is_development() {
                    Arc::new(MemoryStore::with_demo_menu())
                } else {
                    Arc::new(MemoryStore::new())
                }
            }
        };

        let identity: Arc<dyn IdentityProvider> = match &config.identity {
            IdentityMode::Hosted { url, api_key } => {
                tracing::info!(url = %url, "Verifying tokens with the hosted identity provider");
                Arc::new(HostedIdentityProvider::new(
                    url.clone(),
                    api_key.clone(),
                    config.identity_timeout,
                )?)
            }
            IdentityMode::LocalJwt { secret } => {
                tracing::info!("Verifying tokens locally with the JWT secret");
                Arc::new(JwtIdentityProvider::new(secret))
            }
        };

        Ok(Self::new(store, identity)
            .with_transitions(config.transitions.clone())
            .with_bootstrap_admins(&config.bootstrap_admin_emails))
    }

    /// Role of an authenticated identity
    ///
    /// Bootstrap admin list first, then the stored assignment (by user id,
    /// then by email), else `customer`.
    pub async fn resolve_role(&self, user_id: &str, email: Option<&str>) -> Result<Role, AppError> {
        let email = email.map(|e| e.trim().to_lowercase());
        if email
            .as_deref()
            .is_some_and(|e| self.bootstrap_admins.contains(e))
        {
            return Ok(Role::Admin);
        }

        let role = self.store.find_role(user_id, email.as_deref()).await?;
        Ok(role.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DirectoryStore, RoleUpsert};

    fn state(store: Arc<MemoryStore>) -> AppState {
        AppState::new(store, Arc::new(JwtIdentityProvider::new("secret")))
    }

    #[tokio::test]
    async fn test_resolve_role_defaults_to_customer() {
        let state = state(Arc::new(MemoryStore::new()));
        assert_eq!(state.resolve_role("u1", Some("a@b.co")).await.unwrap(), Role::Customer);
        assert_eq!(state.resolve_role("u1", None).await.unwrap(), Role::Customer);
    }

    #[tokio::test]
    async fn test_resolve_role_uses_assignments_and_bootstrap_list() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert_role_assignment(&RoleUpsert {
                user_id: None,
                email: Some("chef@example.com".into()),
                role: Role::Staff,
            })
            .await
            .unwrap();
        let state = state(store).with_bootstrap_admins(["Owner@Example.com"]);

        assert_eq!(
            state.resolve_role("u2", Some("chef@example.com")).await.unwrap(),
            Role::Staff
        );
        assert_eq!(
            state.resolve_role("u3", Some("OWNER@example.com")).await.unwrap(),
            Role::Admin
        );
    }
}
