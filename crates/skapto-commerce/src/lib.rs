//! Skapto Commerce - Commerce provider integration
//!
//! Talks to the subscription backend: fetches customer entitlement
//! snapshots, registers purchases, restores purchases and loads the
//! paywall offerings.
//!
//! # Example
//!
//! ```rust,ignore
//! use skapto_commerce::{CommerceConfig, CommerceProvider, RevenueCatProvider};
//!
//! let config = CommerceConfig::new("appl_...", "user-123");
//! let provider = RevenueCatProvider::new(config)?;
//!
//! let snapshot = provider.fetch_customer_info().await?;
//! let offerings = provider.offerings().await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod revenuecat;

pub use config::{CommerceConfig, DEFAULT_BASE_URL};
pub use error::{CommerceError, CommerceOperation};
pub use provider::{CommerceProvider, PurchaseOutcome, PurchaseRequest};
pub use revenuecat::RevenueCatProvider;
