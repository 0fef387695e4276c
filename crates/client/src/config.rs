//! Client configuration

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/fhir";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration, usually loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            bearer_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("FHIR_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            api_key: std::env::var("FHIR_API_KEY").ok().filter(|k| !k.is_empty()),
            bearer_token: std::env::var("FHIR_BEARER_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout: std::env::var("FHIR_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ClientConfig::new("http://fhir.example.org/r4")
            .with_api_key("secret")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://fhir.example.org/r4");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert!(config.bearer_token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn default_points_at_localhost() {
        let config = ClientConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
