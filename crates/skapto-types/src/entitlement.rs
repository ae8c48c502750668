//! Entitlement snapshot types supplied by the commerce provider

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store product identifier (e.g. `singleVisit`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Create a new product ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Store transaction identifier of a single purchase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl TransactionId {
    /// Create a new transaction ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stand-in id for an active pass entitlement that has no purchase record.
    ///
    /// Keyed on the entitlement name and its expiry so the grant can be
    /// consumed exactly once per entitlement period.
    pub fn placeholder(entitlement: &str, expires_at: Option<DateTime<Utc>>) -> Self {
        let expiry = expires_at.map_or_else(|| "none".to_string(), |e| e.to_rfc3339());
        Self(format!("placeholder:{entitlement}:{expiry}"))
    }

    /// Whether this id was synthesized by [`TransactionId::placeholder`]
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with("placeholder:")
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// State of one named entitlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementInfo {
    /// Whether the entitlement currently grants access
    pub is_active: bool,
    /// When the entitlement lapses (`None` for lifetime grants)
    pub expires_at: Option<DateTime<Utc>>,
}

impl EntitlementInfo {
    /// Active entitlement
    pub const fn active(expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            is_active: true,
            expires_at,
        }
    }

    /// Lapsed entitlement
    pub const fn inactive(expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            is_active: false,
            expires_at,
        }
    }
}

/// Non-subscription (one-time) purchase record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Product that was bought
    pub product_id: ProductId,
    /// Store transaction of the purchase
    pub transaction_id: TransactionId,
    /// When the purchase happened, if known
    #[serde(default)]
    pub purchased_at: Option<DateTime<Utc>>,
}

impl PurchaseRecord {
    /// Create a purchase record without a timestamp
    pub fn new(product_id: impl Into<ProductId>, transaction_id: impl Into<TransactionId>) -> Self {
        Self {
            product_id: product_id.into(),
            transaction_id: transaction_id.into(),
            purchased_at: None,
        }
    }
}

/// Read-only customer snapshot from the commerce provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementSnapshot {
    /// Entitlements by name
    #[serde(default)]
    pub entitlements: HashMap<String, EntitlementInfo>,
    /// One-time purchases, most recent first
    #[serde(default)]
    pub purchases: Vec<PurchaseRecord>,
}

impl EntitlementSnapshot {
    /// Empty snapshot (no entitlements, no purchases)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entitlement
    #[must_use]
    pub fn with_entitlement(mut self, name: impl Into<String>, info: EntitlementInfo) -> Self {
        self.entitlements.insert(name.into(), info);
        self
    }

    /// Append a purchase; callers append in most-recent-first order
    #[must_use]
    pub fn with_purchase(mut self, record: PurchaseRecord) -> Self {
        self.purchases.push(record);
        self
    }

    /// Look up an entitlement by name
    pub fn entitlement(&self, name: &str) -> Option<&EntitlementInfo> {
        self.entitlements.get(name)
    }

    /// Whether the named entitlement exists and is active
    pub fn is_entitlement_active(&self, name: &str) -> bool {
        self.entitlement(name).is_some_and(|e| e.is_active)
    }

    /// Most recent purchase of a product
    pub fn latest_purchase_of(&self, product_id: &ProductId) -> Option<&PurchaseRecord> {
        self.purchases.iter().find(|p| &p.product_id == product_id)
    }

    /// All-time number of purchases of a product
    pub fn purchase_count_of(&self, product_id: &ProductId) -> usize {
        self.purchases
            .iter()
            .filter(|p| &p.product_id == product_id)
            .count()
    }
}
