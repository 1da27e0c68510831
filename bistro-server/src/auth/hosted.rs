//! Hosted identity provider adapter
//!
//! Asks the hosted auth service who a token belongs to
//! (`GET {base}/auth/v1/user` with the project API key).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::provider::{Identity, IdentityError, IdentityProvider};

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Remote token verification over HTTP
#[derive(Clone)]
pub struct HostedIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HostedIdentityProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let user: UserResponse = response
                    .json()
                    .await
                    .map_err(|e| IdentityError::Unavailable(format!("malformed user: {e}")))?;
                Ok(Identity {
                    user_id: user.id,
                    email: user.email,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::InvalidToken("rejected by identity provider".into()))
            }
            status => Err(IdentityError::Unavailable(format!(
                "identity provider answered {status}"
            ))),
        }
    }
}
