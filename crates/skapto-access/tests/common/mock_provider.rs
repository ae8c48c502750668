//! Scriptable commerce provider for testing

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use skapto_commerce::{CommerceError, CommerceProvider, PurchaseOutcome, PurchaseRequest};
use skapto_types::{EntitlementSnapshot, Offering};
use tokio::sync::oneshot;

/// In-memory commerce provider.
///
/// Customer info calls return the configured snapshot, unless a gate was
/// queued with [`MockCommerceProvider::gate_next_fetch`], in which case the
/// call blocks until the test releases it.
#[derive(Default)]
pub struct MockCommerceProvider {
    customer_info: Mutex<Option<Result<EntitlementSnapshot, CommerceError>>>,
    purchase_result: Mutex<Option<Result<EntitlementSnapshot, CommerceError>>>,
    offerings: Mutex<Vec<Offering>>,
    gates: Mutex<VecDeque<oneshot::Receiver<EntitlementSnapshot>>>,
    purchase_gate: Mutex<Option<oneshot::Receiver<EntitlementSnapshot>>>,
    fetch_calls: AtomicUsize,
    purchase_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockCommerceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider answering every customer info call with `snapshot`
    pub fn with_snapshot(snapshot: EntitlementSnapshot) -> Self {
        let provider = Self::new();
        provider.set_customer_info(Ok(snapshot));
        provider
    }

    pub fn set_customer_info(&self, result: Result<EntitlementSnapshot, CommerceError>) {
        *self.customer_info.lock().unwrap() = Some(result);
    }

    pub fn set_purchase_result(&self, result: Result<EntitlementSnapshot, CommerceError>) {
        *self.purchase_result.lock().unwrap() = Some(result);
    }

    pub fn set_offerings(&self, offerings: Vec<Offering>) {
        *self.offerings.lock().unwrap() = offerings;
    }

    /// Make the next customer info call wait for the returned sender
    pub fn gate_next_fetch(&self) -> oneshot::Sender<EntitlementSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Make the next purchase wait for the returned sender
    pub fn gate_next_purchase(&self) -> oneshot::Sender<EntitlementSnapshot> {
        let (tx, rx) = oneshot::channel();
        *self.purchase_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Number of purchase calls started so far
    pub fn purchase_calls(&self) -> usize {
        self.purchase_calls.load(Ordering::SeqCst)
    }

    /// Number of customer info calls started so far
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn configured(&self) -> Result<EntitlementSnapshot, CommerceError> {
        self.customer_info
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(EntitlementSnapshot::new()))
    }
}

#[async_trait]
impl CommerceProvider for MockCommerceProvider {
    async fn fetch_customer_info(&self) -> Result<EntitlementSnapshot, CommerceError> {
        let gate = self.gates.lock().unwrap().pop_front();
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx
                .await
                .map_err(|_| CommerceError::Transport("gate dropped".to_string())),
            None => self.configured(),
        }
    }

    async fn purchase(&self, request: &PurchaseRequest) -> Result<PurchaseOutcome, CommerceError> {
        let gate = self.purchase_gate.lock().unwrap().take();
        self.purchase_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(rx) = gate {
            let snapshot = rx
                .await
                .map_err(|_| CommerceError::Transport("gate dropped".to_string()))?;
            return Ok(PurchaseOutcome {
                snapshot,
                product_id: request.package.product_id.clone(),
            });
        }

        let result = self
            .purchase_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(CommerceError::PurchaseCancelled));
        result.map(|snapshot| PurchaseOutcome {
            snapshot,
            product_id: request.package.product_id.clone(),
        })
    }

    async fn restore_purchases(&self) -> Result<EntitlementSnapshot, CommerceError> {
        self.configured()
    }

    async fn offerings(&self) -> Result<Vec<Offering>, CommerceError> {
        Ok(self.offerings.lock().unwrap().clone())
    }
}
