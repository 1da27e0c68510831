//! Client configuration

/// Where the client talks to
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API server base URL (e.g., "http://localhost:4000")
    pub base_url: String,

    /// Hosted identity service base URL
    pub identity_url: Option<String>,

    /// Public API key of the identity service
    pub identity_api_key: Option<String>,

    /// Bearer token for authenticated calls
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            identity_url: None,
            identity_api_key: None,
            token: None,
            timeout: 15,
        }
    }

    /// Set the hosted identity service
    pub fn with_identity(mut self, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.identity_url = Some(url.into().trim_end_matches('/').to_string());
        self.identity_api_key = Some(api_key.into());
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:4000")
    }
}
