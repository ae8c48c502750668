//! Purchase handlers

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use skapto_commerce::PurchaseRequest;

use crate::error::ApiResult;
use crate::handlers::shared::{
    record_op_duration, validate_fetch_token, validate_identifier, SubscriptionResponse,
};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    /// Package from one of the offerings
    pub package_identifier: String,
    /// Store receipt produced by the device
    pub fetch_token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/purchases
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(req): Json<CreatePurchaseRequest>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let start = Instant::now();

    validate_identifier(&req.package_identifier, "package_identifier")?;
    validate_fetch_token(&req.fetch_token)?;

    let result = async {
        let package = state.storefront.find_package(&req.package_identifier).await?;
        let request = PurchaseRequest {
            package,
            fetch_token: req.fetch_token,
        };
        state.storefront.purchase(&request).await
    }
    .await;
    record_op_duration("purchase", start, result.is_ok());

    let sub = result?;
    tracing::info!(package = %req.package_identifier, plan = ?sub.plan(), "Purchase completed");

    Ok(Json(SubscriptionResponse::from(&sub)))
}

/// POST /api/v1/purchases/restore
pub async fn restore_purchases(
    State(state): State<AppState>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let start = Instant::now();

    let result = state.storefront.restore().await;
    record_op_duration("restore", start, result.is_ok());

    Ok(Json(SubscriptionResponse::from(&result?)))
}
