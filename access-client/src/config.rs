//! Client configuration
//!
//! | Variable                      | Default                 |
//! |-------------------------------|-------------------------|
//! | `ACCESS_API_URL`              | `http://localhost:5017` |
//! | `ACCESS_API_TOKEN`            | unset                   |
//! | `ACCESS_REQUEST_TIMEOUT_SECS` | `30`                    |

use crate::{ClientResult, HttpClient};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5017";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the access-control backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:5017")
    pub base_url: String,

    /// Bearer token sent with every request
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from the environment (a `.env` file is honored if present)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::new(
            std::env::var("ACCESS_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        );
        config.token = std::env::var("ACCESS_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        config.timeout = std::env::var("ACCESS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        config
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
    pub fn build_http_client(&self) -> ClientResult<HttpClient> {
        HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
