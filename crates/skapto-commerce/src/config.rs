//! Commerce provider configuration

use std::time::Duration;

/// Default RevenueCat REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.revenuecat.com/v1";

/// RevenueCat client configuration
#[derive(Clone)]
pub struct CommerceConfig {
    /// Public or secret API key
    pub api_key: String,
    /// App user whose entitlements are managed
    pub app_user_id: String,
    /// REST base URL
    pub base_url: String,
    /// Value of the `X-Platform` header (`ios`, `android`, `stripe`, ...)
    pub platform: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl CommerceConfig {
    /// Create a new commerce config
    pub fn new(api_key: impl Into<String>, app_user_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_user_id: app_user_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            platform: "ios".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Override the REST base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the platform header
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("api_key", &"[REDACTED]")
            .field("app_user_id", &self.app_user_id)
            .field("base_url", &self.base_url)
            .field("platform", &self.platform)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CommerceConfig::new("appl_key", "user-1");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.platform, "ios");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = CommerceConfig::new("k", "u").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let config = CommerceConfig::new("sk_super_secret", "user-1");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk_super_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
