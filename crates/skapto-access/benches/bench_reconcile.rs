//! Benchmarks for reconciliation and booking decisions

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skapto_access::{decide, Reconciler};
use skapto_store::{ConsumptionLedger, StoreResult};
use skapto_types::{
    EntitlementInfo, EntitlementSnapshot, PurchaseRecord, Subscription, TransactionId, Workshop,
    WorkshopId,
};

struct SetLedger(HashSet<TransactionId>);

#[async_trait]
impl ConsumptionLedger for SetLedger {
    fn has(&self, transaction_id: &TransactionId) -> bool {
        self.0.contains(transaction_id)
    }

    async fn mark_consumed(&self, _: &TransactionId) -> StoreResult<()> {
        Ok(())
    }

    async fn try_consume(&self, _: &TransactionId) -> StoreResult<bool> {
        Ok(false)
    }
}

fn pass_snapshot(purchases: usize) -> EntitlementSnapshot {
    (0..purchases).fold(
        EntitlementSnapshot::new().with_entitlement("single_visit", EntitlementInfo::active(None)),
        |snapshot, i| {
            let product = if i % 3 == 0 { "singleVisit" } else { "stickerPack" };
            snapshot.with_purchase(PurchaseRecord::new(product, format!("tx-{i}").as_str()))
        },
    )
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let reconciler = Reconciler::default();

    for count in [1, 10, 100] {
        let snapshot = pass_snapshot(count);
        let ledger = SetLedger((0..count).map(|i| TransactionId::new(format!("tx-{}", i + 1))).collect());

        group.bench_with_input(BenchmarkId::new("single_visit", count), &snapshot, |b, snapshot| {
            b.iter(|| reconciler.reconcile(black_box(snapshot), &ledger));
        });

        group.bench_with_input(BenchmarkId::new("pass_count", count), &snapshot, |b, snapshot| {
            b.iter(|| reconciler.daily_passes_purchased_count(black_box(snapshot)));
        });
    }

    let monthly = pass_snapshot(100)
        .with_entitlement("monthly_membership", EntitlementInfo::active(None));
    let empty = SetLedger(HashSet::new());
    group.bench_function("monthly", |b| {
        b.iter(|| reconciler.reconcile(black_box(&monthly), &empty));
    });

    group.finish();
}

fn bench_decide(c: &mut Criterion) {
    let workshop = Workshop {
        id: WorkshopId::new(),
        title: "Music & Movement".to_string(),
        instructor: "James Brown".to_string(),
        age_range: "3-5 years".to_string(),
        starts_at: Utc::now(),
        duration_minutes: 45,
        max_participants: 15,
        spots_available: 7,
        requires_membership: true,
    };
    let subscription = Subscription::single_visit(None);

    c.bench_function("decide", |b| {
        b.iter(|| decide(black_box(&subscription), black_box(&workshop)));
    });
}

criterion_group!(benches, bench_reconcile, bench_decide);
criterion_main!(benches);
