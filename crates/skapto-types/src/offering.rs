//! Offerings and packages presented on the paywall

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// A purchasable package within an offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package identifier (e.g. `$rc_monthly`)
    pub identifier: String,
    /// Store product sold by this package
    pub product_id: ProductId,
}

/// A group of packages configured in the commerce dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    /// Offering identifier
    pub identifier: String,
    /// Dashboard description
    #[serde(default)]
    pub description: String,
    /// Whether this is the current offering
    #[serde(default)]
    pub is_current: bool,
    /// Packages, in dashboard order
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Offering {
    /// Find a package by identifier
    pub fn package(&self, identifier: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.identifier == identifier)
    }
}
