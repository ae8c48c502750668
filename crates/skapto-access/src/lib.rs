//! Skapto Access - Entitlement and booking logic
//!
//! Core storefront functionality: reconciling commerce entitlements into a
//! local subscription, tracking spent single visit passes, and authorizing
//! workshop bookings.

pub mod authorize;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod service;

pub use authorize::{can_book, complete_booking, decide, BookingDecision};
pub use config::{AccessConfig, MissingTransactionPolicy};
pub use error::AccessError;
pub use reconcile::Reconciler;
pub use service::{BookingOutcome, StorefrontService};
