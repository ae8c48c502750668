//! Configuration types for entitlement reconciliation

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skapto_types::ProductId;

/// Default name of the monthly membership entitlement
pub const DEFAULT_MONTHLY_ENTITLEMENT: &str = "monthly_membership";
/// Default name of the single visit entitlement
pub const DEFAULT_SINGLE_VISIT_ENTITLEMENT: &str = "single_visit";
/// Default store product id of the single visit pass
pub const DEFAULT_SINGLE_VISIT_PRODUCT: &str = "singleVisit";

/// What to do when the single visit entitlement is active but no matching
/// purchase record exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTransactionPolicy {
    /// Treat the entitlement as unusable
    Deny,
    /// Stand in a placeholder transaction id keyed on the entitlement period,
    /// which is consumed like a real one
    #[default]
    SynthesizeToken,
}

impl std::fmt::Display for MissingTransactionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deny => write!(f, "deny"),
            Self::SynthesizeToken => write!(f, "synthesize_token"),
        }
    }
}

impl FromStr for MissingTransactionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "deny" => Ok(Self::Deny),
            "synthesize_token" | "synthesize" => Ok(Self::SynthesizeToken),
            other => Err(format!("unknown missing transaction policy: {other}")),
        }
    }
}

/// Reconciliation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    /// Entitlement granting the monthly membership
    pub monthly_entitlement: String,
    /// Entitlement granting a single visit
    pub single_visit_entitlement: String,
    /// Product whose purchases back single visit passes
    pub single_visit_product: ProductId,
    /// Fallback for an active pass without a purchase record
    pub missing_transaction_policy: MissingTransactionPolicy,
}

impl AccessConfig {
    /// Create a config with the storefront's default names
    pub fn new() -> Self {
        Self {
            monthly_entitlement: DEFAULT_MONTHLY_ENTITLEMENT.to_string(),
            single_visit_entitlement: DEFAULT_SINGLE_VISIT_ENTITLEMENT.to_string(),
            single_visit_product: ProductId::from(DEFAULT_SINGLE_VISIT_PRODUCT),
            missing_transaction_policy: MissingTransactionPolicy::default(),
        }
    }

    /// Set the monthly entitlement name
    #[must_use]
    pub fn with_monthly_entitlement(mut self, name: impl Into<String>) -> Self {
        self.monthly_entitlement = name.into();
        self
    }

    /// Set the single visit entitlement name
    #[must_use]
    pub fn with_single_visit_entitlement(mut self, name: impl Into<String>) -> Self {
        self.single_visit_entitlement = name.into();
        self
    }

    /// Set the single visit product id
    #[must_use]
    pub fn with_single_visit_product(mut self, product: impl Into<ProductId>) -> Self {
        self.single_visit_product = product.into();
        self
    }

    /// Set the missing transaction policy
    #[must_use]
    pub fn with_missing_transaction_policy(mut self, policy: MissingTransactionPolicy) -> Self {
        self.missing_transaction_policy = policy;
        self
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self::new()
    }
}
