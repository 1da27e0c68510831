//! Sign-in session against the hosted identity service
//!
//! The service speaks the GoTrue REST dialect:
//! - `POST /auth/v1/token?grant_type=password` signs in
//! - `POST /auth/v1/signup` registers (and signs in when auto-confirm is on)
//! - `POST /auth/v1/logout` revokes the session
//!
//! [`Auth`] keeps the current [`SessionState`] in a watch channel so views
//! can wait for the first resolution instead of treating "not loaded yet"
//! as "signed out".

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::{ClientConfig, ClientError, ClientResult};

/// User record attached to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Signed-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: IdentityUser,
}

impl Session {
    /// Session around a token obtained out of band
    pub fn from_token(access_token: impl Into<String>, user: IdentityUser) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            user,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| at <= Utc::now().timestamp())
    }
}

/// Session as seen by the UI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Not loaded yet
    #[default]
    Unresolved,
    /// Loaded; nobody is signed in
    Absent,
    Present(Session),
}

impl SessionState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Present(session) => Some(session),
            _ => None,
        }
    }
}

/// Identity service operations
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session>;

    /// `None` when the account needs email confirmation before a session exists
    async fn sign_up(&self, email: &str, password: &str) -> ClientResult<Option<Session>>;

    async fn sign_out(&self, access_token: &str) -> ClientResult<()>;
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Token response of the identity service
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<IdentityUser>,
}

impl TokenResponse {
    fn into_session(self) -> Option<Session> {
        let access_token = self.access_token?;
        let user = self.user?;
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        Some(Session {
            access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user,
        })
    }
}

/// GoTrue-compatible hosted identity service
#[derive(Debug, Clone)]
pub struct HostedIdentity {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HostedIdentity {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build from a client configuration carrying the identity settings
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        match (&config.identity_url, &config.identity_api_key) {
            (Some(url), Some(key)) => Self::new(url, key, Duration::from_secs(config.timeout)),
            _ => Err(ClientError::Config(
                "identity service URL and API key are required".into(),
            )),
        }
    }

    async fn token_request(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<TokenResponse> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::Identity(identity_error_message(&bytes)));
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

/// Pull the human-readable message out of an identity error body
fn identity_error_message(bytes: &[u8]) -> String {
    let fallback = || String::from_utf8_lossy(bytes).trim().to_string();
    let Ok(body) = serde_json::from_slice::<Value>(bytes) else {
        return fallback();
    };
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

#[async_trait]
impl IdentityBackend for HostedIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        self.token_request("/auth/v1/token?grant_type=password", email, password)
            .await?
            .into_session()
            .ok_or_else(|| ClientError::InvalidResponse("token response without session".into()))
    }

    async fn sign_up(&self, email: &str, password: &str) -> ClientResult<Option<Session>> {
        Ok(self
            .token_request("/auth/v1/signup", email, password)
            .await?
            .into_session())
    }

    async fn sign_out(&self, access_token: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await?;
        Err(ClientError::Identity(identity_error_message(&bytes)))
    }
}

/// Session holder shared by the client views
pub struct Auth<B> {
    backend: B,
    state: watch::Sender<SessionState>,
}

impl<B: IdentityBackend> Auth<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(SessionState::Unresolved);
        Self { backend, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Bearer token of the current session, if any
    pub fn access_token(&self) -> Option<String> {
        self.state
            .borrow()
            .session()
            .map(|s| s.access_token.clone())
    }

    /// Resolve the initial state from a persisted session; expired ones count as absent
    pub fn restore(&self, persisted: Option<Session>) {
        let next = match persisted {
            Some(session) if !session.is_expired() => SessionState::Present(session),
            _ => SessionState::Absent,
        };
        self.state.send_replace(next);
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        let session = self.backend.sign_in(email.trim(), password).await?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.state.send_replace(SessionState::Present(session.clone()));
        Ok(session)
    }

    /// Register; the session is only set when the service signed the user in
    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<Option<Session>> {
        let session = self.backend.sign_up(email.trim(), password).await?;
        if let Some(session) = &session {
            self.state.send_replace(SessionState::Present(session.clone()));
        }
        Ok(session)
    }

    /// Drop the local session, then revoke it remotely
    pub async fn sign_out(&self) -> ClientResult<()> {
        let previous = self.state.send_replace(SessionState::Absent);
        match previous {
            SessionState::Present(session) => self.backend.sign_out(&session.access_token).await,
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-process identity service accepting a single password
    #[derive(Default)]
    pub(crate) struct FakeIdentity {
        pub signed_out: Mutex<Vec<String>>,
    }

    pub(crate) fn session_for(user_id: &str, email: &str) -> Session {
        Session::from_token(
            format!("token-{user_id}"),
            IdentityUser {
                id: user_id.to_string(),
                email: Some(email.to_string()),
            },
        )
    }

    #[async_trait]
    impl IdentityBackend for FakeIdentity {
        async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
            if password != "secret" {
                return Err(ClientError::Identity("Invalid login credentials".into()));
            }
            Ok(session_for("u-1", email))
        }

        async fn sign_up(&self, _email: &str, _password: &str) -> ClientResult<Option<Session>> {
            Ok(None)
        }

        async fn sign_out(&self, access_token: &str) -> ClientResult<()> {
            self.signed_out.lock().unwrap().push(access_token.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_state_starts_unresolved() {
        let auth = Auth::new(FakeIdentity::default());
        assert_eq!(auth.state(), SessionState::Unresolved);
        auth.restore(None);
        assert_eq!(auth.state(), SessionState::Absent);
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let auth = Auth::new(FakeIdentity::default());
        let mut rx = auth.subscribe();

        let session = auth.sign_in(" a@x.com ", "secret").await.unwrap();
        assert_eq!(session.user.email.as_deref(), Some("a@x.com"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().session(), Some(&session));
        assert_eq!(auth.access_token().as_deref(), Some("token-u-1"));

        auth.sign_out().await.unwrap();
        assert_eq!(auth.state(), SessionState::Absent);
        assert_eq!(
            auth.backend.signed_out.lock().unwrap().as_slice(),
            ["token-u-1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_state() {
        let auth = Auth::new(FakeIdentity::default());
        auth.restore(None);
        let err = auth.sign_in("a@x.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Sign-in failed: Invalid login credentials");
        assert_eq!(auth.state(), SessionState::Absent);
    }

    #[tokio::test]
    async fn test_unconfirmed_sign_up_has_no_session() {
        let auth = Auth::new(FakeIdentity::default());
        auth.restore(None);
        assert!(auth.sign_up("a@x.com", "secret").await.unwrap().is_none());
        assert_eq!(auth.state(), SessionState::Absent);
    }

    #[test]
    fn test_expired_session_restores_as_absent() {
        let auth = Auth::new(FakeIdentity::default());
        let mut session = session_for("u-1", "a@x.com");
        session.expires_at = Some(Utc::now().timestamp() - 10);
        auth.restore(Some(session));
        assert_eq!(auth.state(), SessionState::Absent);
    }

    #[test]
    fn test_identity_error_message() {
        let body = br#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(identity_error_message(body), "Invalid login credentials");
        assert_eq!(identity_error_message(b"bad gateway"), "bad gateway");
    }

    #[test]
    fn test_token_response_without_session() {
        let body = r#"{"user":{"id":"u-1","email":"a@x.com"}}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.into_session().is_none());
    }
}
