//! Local JWT verification
//!
//! Verifies HS256 access tokens signed with the identity provider's JWT
//! secret, without a network round trip. Also issues tokens with the same
//! shape for development and tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::provider::{Identity, IdentityError, IdentityProvider};

/// Audience the hosted provider puts on user access tokens
pub const AUDIENCE: &str = "authenticated";

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// HS256 token verifier/issuer
#[derive(Clone)]
pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue an access token valid for `ttl`
    pub fn issue(
        &self,
        user_id: &str,
        email: Option<&str>,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(String::from),
            aud: AUDIENCE.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["sub", "exp", "aud"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::ExpiredToken,
                _ => IdentityError::InvalidToken(e.to_string()),
            })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let claims = self.validate(token)?;
        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-bytes-long!!";

    #[tokio::test]
    async fn test_issue_and_verify() {
        let provider = JwtIdentityProvider::new(SECRET);
        let token = provider
            .issue("user-1", Some("ada@example.com"), Duration::minutes(5))
            .unwrap();
        let identity = provider.verify(&token).await.unwrap();
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let provider = JwtIdentityProvider::new(SECRET);
        let token = provider
            .issue("user-1", None, Duration::minutes(-10))
            .unwrap();
        assert!(matches!(
            provider.verify(&token).await,
            Err(IdentityError::ExpiredToken)
        ));
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = JwtIdentityProvider::new(SECRET)
            .issue("user-1", None, Duration::minutes(5))
            .unwrap();
        let other = JwtIdentityProvider::new("another-secret-at-least-32-bytes!!");
        assert!(matches!(
            other.verify(&token).await,
            Err(IdentityError::InvalidToken(_))
        ));
        assert!(matches!(
            other.verify("not.a.jwt").await,
            Err(IdentityError::InvalidToken(_))
        ));
    }
}
