//! Booking authorization
//!
//! Decides whether a subscription may book a workshop and, for single visit
//! passes, spends the pass in the consumption ledger. Spending is
//! irreversible: there is no rollback if a later booking step fails.

use serde::{Deserialize, Serialize};
use skapto_store::ConsumptionLedger;
use skapto_types::{PlanKind, Subscription, TransactionId, Workshop};
use tracing::{info, warn};

use crate::AccessError;

/// Why a booking is or is not allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingDecision {
    /// The workshop is open to everyone
    OpenWorkshop,
    /// Covered by an active monthly membership
    Membership,
    /// Covered by an unspent single visit pass
    SingleVisitPass,
    /// The customer has to buy a plan first
    RequiresPurchase,
}

impl BookingDecision {
    /// Whether the booking may proceed
    pub const fn is_allowed(self) -> bool {
        !matches!(self, Self::RequiresPurchase)
    }

    /// Whether completing the booking spends a pass
    pub const fn consumes_pass(self) -> bool {
        matches!(self, Self::SingleVisitPass)
    }

    /// Metric label
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenWorkshop => "open_workshop",
            Self::Membership => "membership",
            Self::SingleVisitPass => "single_visit_pass",
            Self::RequiresPurchase => "requires_purchase",
        }
    }
}

/// Classify a booking attempt
pub fn decide(subscription: &Subscription, workshop: &Workshop) -> BookingDecision {
    if !workshop.requires_membership {
        return BookingDecision::OpenWorkshop;
    }

    match subscription.plan() {
        Some(PlanKind::Monthly) if subscription.is_active() => BookingDecision::Membership,
        Some(PlanKind::SingleVisit) if subscription.remaining_visits() > 0 => {
            BookingDecision::SingleVisitPass
        }
        _ => BookingDecision::RequiresPurchase,
    }
}

/// Whether the subscription may book the workshop
///
/// Capacity is not considered here.
pub fn can_book(subscription: &Subscription, workshop: &Workshop) -> bool {
    decide(subscription, workshop).is_allowed()
}

/// Finish an authorized booking.
///
/// Single visit bookings consume `pass_transaction`; every other decision
/// leaves the ledger alone. Returns the decision that was applied.
pub async fn complete_booking<L>(
    subscription: &Subscription,
    workshop: &Workshop,
    ledger: &L,
    pass_transaction: Option<&TransactionId>,
) -> Result<BookingDecision, AccessError>
where
    L: ConsumptionLedger + ?Sized,
{
    let decision = decide(subscription, workshop);
    if !decision.consumes_pass() {
        return Ok(decision);
    }

    let tx = pass_transaction.ok_or_else(|| {
        warn!(workshop_id = %workshop.id, "Pass booking without a backing transaction");
        AccessError::MissingPassTransaction
    })?;

    if !ledger.try_consume(tx).await? {
        warn!(workshop_id = %workshop.id, transaction_id = %tx, "Pass already redeemed");
        return Err(AccessError::PassAlreadyRedeemed);
    }

    info!(workshop_id = %workshop.id, transaction_id = %tx, "Single visit pass redeemed");
    Ok(decision)
}
