//! Commerce provider abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use skapto_types::{EntitlementSnapshot, Offering, Package, ProductId};

use crate::CommerceError;

/// A purchase to register with the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// Package being bought
    pub package: Package,
    /// Store receipt / purchase token produced by the device
    pub fetch_token: String,
}

/// Result of a successful purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOutcome {
    /// Customer snapshot after the purchase
    pub snapshot: EntitlementSnapshot,
    /// Product that was bought
    pub product_id: ProductId,
}

/// Commerce provider trait
///
/// Abstracts the subscription backend (RevenueCat, or a fake in tests).
/// Every call may suspend; none of them touch local state.
#[async_trait]
pub trait CommerceProvider: Send + Sync {
    /// Fetch the current customer snapshot
    async fn fetch_customer_info(&self) -> Result<EntitlementSnapshot, CommerceError>;

    /// Register a purchase
    async fn purchase(&self, request: &PurchaseRequest) -> Result<PurchaseOutcome, CommerceError>;

    /// Restore previous purchases
    async fn restore_purchases(&self) -> Result<EntitlementSnapshot, CommerceError>;

    /// Offerings available to the customer, current offering first
    async fn offerings(&self) -> Result<Vec<Offering>, CommerceError>;
}
