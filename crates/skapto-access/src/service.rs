//! Storefront service - ties together the commerce provider, the reconciler
//! and the pass ledger

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skapto_commerce::{CommerceOperation, CommerceProvider, PurchaseRequest};
use skapto_store::ConsumptionLedger;
use skapto_types::{EntitlementSnapshot, Offering, Package, Subscription, Workshop};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    authorize::{self, BookingDecision},
    config::AccessConfig,
    reconcile::Reconciler,
    AccessError,
};

/// Result of a booking attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    /// Whether the booking went through
    pub booked: bool,
    /// Authorization decision for the attempt
    pub decision: BookingDecision,
    /// Whether the workshop had no seats left
    pub workshop_full: bool,
}

/// Last applied customer snapshot, tagged with the ticket of the request
/// that produced it
#[derive(Debug, Default)]
struct StorefrontState {
    snapshot: EntitlementSnapshot,
    applied_ticket: u64,
}

/// Storefront service
///
/// Provides the presentation-layer operations:
/// - Refresh, purchase and restore through the commerce provider
/// - Subscription state derived from the last applied snapshot
/// - Booking authorization and pass consumption
///
/// Provider calls run without holding the state lock. A refresh takes its
/// ticket before the fetch starts. Purchase and restore take theirs once the
/// provider has answered, so their snapshot wins over any fetch already in
/// flight. A snapshot is applied only if no later ticket has been applied.
/// Bookings hold the lock across the ledger write so one pass cannot be
/// spent twice.
pub struct StorefrontService<P: CommerceProvider, L: ConsumptionLedger> {
    provider: Arc<P>,
    ledger: Arc<L>,
    reconciler: Reconciler,
    state: Mutex<StorefrontState>,
    next_ticket: AtomicU64,
}

impl<P: CommerceProvider, L: ConsumptionLedger> StorefrontService<P, L> {
    /// Create a new storefront service with an empty snapshot
    pub fn new(config: AccessConfig, provider: Arc<P>, ledger: Arc<L>) -> Self {
        Self {
            provider,
            ledger,
            reconciler: Reconciler::new(config),
            state: Mutex::new(StorefrontState::default()),
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Commerce provider
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Consumption ledger
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Reconciler
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    // =========================================================================
    // Commerce
    // =========================================================================

    /// Fetch the customer snapshot and reconcile.
    ///
    /// On failure the previous snapshot stays in place.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Subscription, AccessError> {
        let ticket = self.take_ticket();
        let snapshot = self.provider.fetch_customer_info().await.map_err(|e| {
            warn!(error = %e, "Customer info refresh failed, keeping last known state");
            AccessError::commerce(CommerceOperation::FetchCustomerInfo, e)
        })?;

        self.apply(ticket, snapshot).await;
        Ok(self.subscription_state().await)
    }

    /// Register a purchase and reconcile with the resulting snapshot
    #[instrument(skip(self, request), fields(package = %request.package.identifier))]
    pub async fn purchase(&self, request: &PurchaseRequest) -> Result<Subscription, AccessError> {
        let product = request.package.product_id.to_string();

        let outcome = match self.provider.purchase(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Purchase failed");
                metrics::counter!("storefront_purchases_total", "product" => product, "result" => "failed")
                    .increment(1);
                return Err(AccessError::commerce(CommerceOperation::Purchase, e));
            }
        };

        metrics::counter!("storefront_purchases_total", "product" => product, "result" => "success")
            .increment(1);
        info!(product_id = %outcome.product_id, "Purchase registered");

        let ticket = self.take_ticket();
        self.apply(ticket, outcome.snapshot).await;
        Ok(self.subscription_state().await)
    }

    /// Restore previous purchases and reconcile
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Subscription, AccessError> {
        let snapshot = self.provider.restore_purchases().await.map_err(|e| {
            warn!(error = %e, "Restore failed");
            AccessError::commerce(CommerceOperation::Restore, e)
        })?;

        let ticket = self.take_ticket();
        self.apply(ticket, snapshot).await;
        Ok(self.subscription_state().await)
    }

    /// Offerings available to the customer, current offering first
    pub async fn offerings(&self) -> Result<Vec<Offering>, AccessError> {
        self.provider
            .offerings()
            .await
            .map_err(|e| AccessError::commerce(CommerceOperation::LoadOfferings, e))
    }

    /// Look up a package across all offerings
    pub async fn find_package(&self, identifier: &str) -> Result<Package, AccessError> {
        self.offerings()
            .await?
            .iter()
            .find_map(|o| o.package(identifier).cloned())
            .ok_or_else(|| AccessError::PackageNotFound(identifier.to_string()))
    }

    // =========================================================================
    // Subscription state
    // =========================================================================

    /// Subscription derived from the last applied snapshot and the ledger
    pub async fn subscription_state(&self) -> Subscription {
        let state = self.state.lock().await;
        self.reconciler.reconcile(&state.snapshot, self.ledger.as_ref())
    }

    /// Copy of the last applied snapshot
    pub async fn snapshot(&self) -> EntitlementSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// All-time number of single visit passes bought, consumed or not
    pub async fn daily_passes_purchased_count(&self) -> usize {
        let state = self.state.lock().await;
        self.reconciler.daily_passes_purchased_count(&state.snapshot)
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    /// Whether the current subscription may book the workshop
    pub async fn can_book_workshop(&self, workshop: &Workshop) -> bool {
        authorize::can_book(&self.subscription_state().await, workshop)
    }

    /// Book a workshop, spending a single visit pass when that is what
    /// authorizes it.
    ///
    /// A full workshop or a missing plan is reported in the outcome, not as
    /// an error.
    #[instrument(skip(self, workshop), fields(workshop_id = %workshop.id))]
    pub async fn book_workshop(&self, workshop: &Workshop) -> Result<BookingOutcome, AccessError> {
        let state = self.state.lock().await;
        let subscription = self.reconciler.reconcile(&state.snapshot, self.ledger.as_ref());
        let decision = authorize::decide(&subscription, workshop);

        if !workshop.has_capacity() {
            debug!("Workshop is full");
            record_booking(decision, "full");
            return Ok(BookingOutcome {
                booked: false,
                decision,
                workshop_full: true,
            });
        }

        if !decision.is_allowed() {
            debug!("Booking requires a purchase");
            record_booking(decision, "denied");
            return Ok(BookingOutcome {
                booked: false,
                decision,
                workshop_full: false,
            });
        }

        let pass_transaction = if decision.consumes_pass() {
            self.reconciler.pass_transaction(&state.snapshot)
        } else {
            None
        };

        let applied = authorize::complete_booking(
            &subscription,
            workshop,
            self.ledger.as_ref(),
            pass_transaction.as_ref(),
        )
        .await
        .inspect_err(|_| record_booking(decision, "error"))?;
        drop(state);

        if applied.consumes_pass() {
            metrics::counter!("storefront_passes_consumed_total").increment(1);
        }
        record_booking(applied, "booked");
        info!(decision = applied.as_str(), "Workshop booked");

        Ok(BookingOutcome {
            booked: true,
            decision: applied,
            workshop_full: false,
        })
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn take_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a snapshot unless a newer request already landed
    async fn apply(&self, ticket: u64, snapshot: EntitlementSnapshot) {
        let mut state = self.state.lock().await;
        if ticket <= state.applied_ticket {
            debug!(ticket, applied = state.applied_ticket, "Discarding stale snapshot");
            return;
        }
        state.snapshot = snapshot;
        state.applied_ticket = ticket;
    }
}

fn record_booking(decision: BookingDecision, result: &'static str) {
    metrics::counter!(
        "storefront_bookings_total",
        "decision" => decision.as_str(),
        "result" => result
    )
    .increment(1);
}

impl<P: CommerceProvider, L: ConsumptionLedger> std::fmt::Debug for StorefrontService<P, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontService")
            .field("reconciler", &self.reconciler)
            .field("next_ticket", &self.next_ticket.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
