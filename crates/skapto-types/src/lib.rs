//! Skapto Types - Shared domain types
//!
//! This crate contains domain types used across the Skapto storefront:
//! - Plans and the derived subscription state
//! - Entitlement snapshots and one-time purchase records
//! - Workshops and paywall offerings

pub mod entitlement;
pub mod offering;
pub mod plan;
pub mod subscription;
pub mod workshop;

pub use entitlement::*;
pub use offering::*;
pub use plan::*;
pub use subscription::*;
pub use workshop::*;
