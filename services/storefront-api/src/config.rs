//! Configuration for the Storefront API service.

use std::time::Duration;

use skapto_access::{AccessConfig, MissingTransactionPolicy};
use skapto_commerce::CommerceConfig;

/// Storefront API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Pass ledger database URL
    pub ledger_database_url: String,
    /// Commerce provider configuration
    pub commerce: CommerceConfig,
    /// Reconciliation configuration
    pub access: AccessConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // RevenueCat
        let api_key = lookup("REVENUECAT_API_KEY").ok_or(ConfigError::Missing("REVENUECAT_API_KEY"))?;
        let app_user_id = lookup("REVENUECAT_APP_USER_ID")
            .ok_or(ConfigError::Missing("REVENUECAT_APP_USER_ID"))?;

        // Ledger
        let ledger_database_url = lookup("LEDGER_DATABASE_URL")
            .unwrap_or_else(|| "sqlite://storefront-ledger.db".to_string());

        // Server port
        let http_port = lookup("HTTP_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Request timeout (HTTP layer and commerce client)
        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;
        let request_timeout = Duration::from_secs(request_timeout_secs);

        // Metrics
        let metrics_enabled = lookup("METRICS_ENABLED")
            .unwrap_or_else(|| "true".to_string())
            .parse()
            .unwrap_or(true);

        let mut commerce =
            CommerceConfig::new(api_key, app_user_id).with_request_timeout(request_timeout);
        if let Some(base_url) = lookup("REVENUECAT_BASE_URL") {
            commerce = commerce.with_base_url(base_url);
        }
        if let Some(platform) = lookup("REVENUECAT_PLATFORM") {
            commerce = commerce.with_platform(platform);
        }

        let mut access = AccessConfig::new();
        if let Some(name) = lookup("MONTHLY_ENTITLEMENT") {
            access = access.with_monthly_entitlement(name);
        }
        if let Some(name) = lookup("SINGLE_VISIT_ENTITLEMENT") {
            access = access.with_single_visit_entitlement(name);
        }
        if let Some(product) = lookup("SINGLE_VISIT_PRODUCT_ID") {
            access = access.with_single_visit_product(product.as_str());
        }
        if let Some(policy) = lookup("MISSING_TRANSACTION_POLICY") {
            let policy: MissingTransactionPolicy = policy
                .parse()
                .map_err(|_| ConfigError::Invalid("MISSING_TRANSACTION_POLICY"))?;
            access = access.with_missing_transaction_policy(policy);
        }

        Ok(Self {
            http_port,
            ledger_database_url,
            commerce,
            access,
            request_timeout,
            metrics_enabled,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
