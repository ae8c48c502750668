//! Entitlement reconciliation
//!
//! Derives the local [`Subscription`] from a commerce snapshot and the pass
//! consumption ledger. Reconciliation is pure: it reads the ledger's
//! in-memory view and never performs I/O, so the result can be recomputed
//! whenever either input changes.
//!
//! Rules, first match wins:
//!
//! 1. An active monthly entitlement grants the membership (unlimited visits).
//! 2. An active single visit entitlement grants one visit, unless the
//!    transaction backing it is already in the ledger.
//! 3. Otherwise nothing is active.

use skapto_store::ConsumptionLedger;
use skapto_types::{EntitlementSnapshot, Subscription, TransactionId};
use tracing::debug;

use crate::config::{AccessConfig, MissingTransactionPolicy};

/// Entitlement reconciler
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: AccessConfig,
}

impl Reconciler {
    /// Create a reconciler
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    /// Reconciler configuration
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Compute the subscription state
    pub fn reconcile<L>(&self, snapshot: &EntitlementSnapshot, ledger: &L) -> Subscription
    where
        L: ConsumptionLedger + ?Sized,
    {
        if let Some(monthly) = snapshot
            .entitlement(&self.config.monthly_entitlement)
            .filter(|e| e.is_active)
        {
            return Subscription::monthly(monthly.expires_at);
        }

        let Some(pass) = snapshot
            .entitlement(&self.config.single_visit_entitlement)
            .filter(|e| e.is_active)
        else {
            return Subscription::inactive();
        };

        match self.pass_transaction(snapshot) {
            Some(tx) if ledger.has(&tx) => {
                debug!(transaction_id = %tx, "Single visit pass already consumed");
                Subscription::inactive()
            }
            Some(_) => Subscription::single_visit(pass.expires_at),
            None => {
                debug!("Single visit entitlement active without a purchase record");
                Subscription::inactive()
            }
        }
    }

    /// Transaction a single visit booking would consume.
    ///
    /// `None` when the single visit entitlement is not active, or when it has
    /// no purchase record and the policy is [`MissingTransactionPolicy::Deny`].
    /// Does not consult the ledger.
    pub fn pass_transaction(&self, snapshot: &EntitlementSnapshot) -> Option<TransactionId> {
        let pass = snapshot
            .entitlement(&self.config.single_visit_entitlement)
            .filter(|e| e.is_active)?;

        if let Some(record) = snapshot.latest_purchase_of(&self.config.single_visit_product) {
            return Some(record.transaction_id.clone());
        }

        match self.config.missing_transaction_policy {
            MissingTransactionPolicy::Deny => None,
            MissingTransactionPolicy::SynthesizeToken => Some(TransactionId::placeholder(
                &self.config.single_visit_entitlement,
                pass.expires_at,
            )),
        }
    }

    /// All-time number of single visit passes bought, consumed or not
    pub fn daily_passes_purchased_count(&self, snapshot: &EntitlementSnapshot) -> usize {
        snapshot.purchase_count_of(&self.config.single_visit_product)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use skapto_store::StoreResult;
    use skapto_types::{EntitlementInfo, PlanKind, PurchaseRecord};

    use super::*;

    #[derive(Default)]
    struct FixedLedger(HashSet<TransactionId>);

    impl FixedLedger {
        fn with(ids: &[&str]) -> Self {
            Self(ids.iter().map(|id| TransactionId::from(*id)).collect())
        }
    }

    #[async_trait]
    impl ConsumptionLedger for FixedLedger {
        fn has(&self, transaction_id: &TransactionId) -> bool {
            self.0.contains(transaction_id)
        }

        async fn mark_consumed(&self, _: &TransactionId) -> StoreResult<()> {
            unreachable!("reconciliation never writes")
        }

        async fn try_consume(&self, _: &TransactionId) -> StoreResult<bool> {
            unreachable!("reconciliation never writes")
        }
    }

    fn pass_snapshot() -> EntitlementSnapshot {
        EntitlementSnapshot::new()
            .with_entitlement("single_visit", EntitlementInfo::active(None))
            .with_purchase(PurchaseRecord::new("singleVisit", "tx-2"))
            .with_purchase(PurchaseRecord::new("singleVisit", "tx-1"))
    }

    #[test]
    fn test_monthly_wins_over_pass() {
        let expiry = Utc::now() + Duration::days(30);
        let snapshot =
            pass_snapshot().with_entitlement("monthly_membership", EntitlementInfo::active(Some(expiry)));

        let sub = Reconciler::default().reconcile(&snapshot, &FixedLedger::default());
        assert_eq!(sub, Subscription::monthly(Some(expiry)));
        assert_eq!(sub.remaining_visits(), 0);
    }

    #[test]
    fn test_inactive_monthly_falls_through_to_pass() {
        let snapshot =
            pass_snapshot().with_entitlement("monthly_membership", EntitlementInfo::inactive(None));

        let sub = Reconciler::default().reconcile(&snapshot, &FixedLedger::default());
        assert_eq!(sub.plan(), Some(PlanKind::SingleVisit));
        assert_eq!(sub.remaining_visits(), 1);
    }

    #[test]
    fn test_only_latest_purchase_is_checked() {
        let reconciler = Reconciler::default();

        // An older consumed pass does not hide the newer one
        let sub = reconciler.reconcile(&pass_snapshot(), &FixedLedger::with(&["tx-1"]));
        assert!(sub.is_active());

        let sub = reconciler.reconcile(&pass_snapshot(), &FixedLedger::with(&["tx-2"]));
        assert_eq!(sub, Subscription::inactive());
    }

    #[test]
    fn test_missing_purchase_record_policies() {
        let expiry = Utc::now() + Duration::hours(12);
        let snapshot = EntitlementSnapshot::new()
            .with_entitlement("single_visit", EntitlementInfo::active(Some(expiry)));

        let deny = Reconciler::new(
            AccessConfig::new().with_missing_transaction_policy(MissingTransactionPolicy::Deny),
        );
        assert_eq!(deny.pass_transaction(&snapshot), None);
        assert!(!deny.reconcile(&snapshot, &FixedLedger::default()).is_active());

        let synth = Reconciler::default();
        let placeholder = synth.pass_transaction(&snapshot).unwrap();
        assert!(placeholder.is_placeholder());
        assert!(synth.reconcile(&snapshot, &FixedLedger::default()).is_active());

        let spent = FixedLedger(HashSet::from([placeholder]));
        assert!(!synth.reconcile(&snapshot, &spent).is_active());
    }

    #[test]
    fn test_pass_transaction_requires_active_entitlement() {
        let snapshot = EntitlementSnapshot::new()
            .with_entitlement("single_visit", EntitlementInfo::inactive(None))
            .with_purchase(PurchaseRecord::new("singleVisit", "tx-1"));

        assert_eq!(Reconciler::default().pass_transaction(&snapshot), None);
        assert_eq!(Reconciler::default().daily_passes_purchased_count(&snapshot), 1);
    }

    #[test]
    fn test_custom_entitlement_names() {
        let reconciler = Reconciler::new(
            AccessConfig::new()
                .with_single_visit_entitlement("day_pass")
                .with_single_visit_product("com.skapto.daypass"),
        );
        let snapshot = EntitlementSnapshot::new()
            .with_entitlement("day_pass", EntitlementInfo::active(None))
            .with_purchase(PurchaseRecord::new("com.skapto.daypass", "tx-9"));

        assert_eq!(
            reconciler.pass_transaction(&snapshot),
            Some(TransactionId::from("tx-9"))
        );
        assert!(reconciler.reconcile(&snapshot, &FixedLedger::default()).is_active());
    }
}
