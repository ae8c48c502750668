//! Snapshot and workshop fixtures

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use skapto_store::{MemoryKeyValueStore, PassLedger};
use skapto_types::{EntitlementInfo, EntitlementSnapshot, PurchaseRecord, Workshop, WorkshopId};

pub const MONTHLY: &str = "monthly_membership";
pub const SINGLE_VISIT: &str = "single_visit";
pub const PASS_PRODUCT: &str = "singleVisit";

/// Workshop with open seats
pub fn workshop(requires_membership: bool) -> Workshop {
    Workshop {
        id: WorkshopId::new(),
        title: "Robot Building Basics".to_string(),
        instructor: "Sarah Chen".to_string(),
        age_range: "8-12 years".to_string(),
        starts_at: Utc::now() + Duration::days(2),
        duration_minutes: 90,
        max_participants: 12,
        spots_available: 5,
        requires_membership,
    }
}

/// Membership-only workshop with no seats left
pub fn full_workshop() -> Workshop {
    Workshop {
        spots_available: 0,
        ..workshop(true)
    }
}

/// Monthly membership expiring in 30 days
pub fn monthly_snapshot() -> EntitlementSnapshot {
    EntitlementSnapshot::new().with_entitlement(
        MONTHLY,
        EntitlementInfo::active(Some(Utc::now() + Duration::days(30))),
    )
}

/// Active single visit entitlement backed by the given transactions,
/// most recent first
pub fn pass_snapshot(transactions: &[&str]) -> EntitlementSnapshot {
    transactions.iter().fold(
        EntitlementSnapshot::new().with_entitlement(SINGLE_VISIT, EntitlementInfo::active(None)),
        |snapshot, tx| snapshot.with_purchase(PurchaseRecord::new(PASS_PRODUCT, *tx)),
    )
}

/// Ledger over a fresh in-memory store
pub async fn memory_ledger() -> (Arc<MemoryKeyValueStore>, Arc<PassLedger<MemoryKeyValueStore>>) {
    let store = Arc::new(MemoryKeyValueStore::new());
    let ledger = PassLedger::open(Arc::clone(&store)).await.unwrap();
    (store, Arc::new(ledger))
}
