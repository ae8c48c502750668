//! Subscription and offering handlers

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use skapto_types::Offering;

use crate::error::ApiResult;
use crate::handlers::shared::{record_op_duration, SubscriptionResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OfferingsResponse {
    pub offerings: Vec<Offering>,
}

#[derive(Debug, Serialize)]
pub struct PassCountResponse {
    pub purchased: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/subscription
///
/// Derived from the last applied snapshot; does not call the provider.
pub async fn get_subscription(State(state): State<AppState>) -> Json<SubscriptionResponse> {
    let sub = state.storefront.subscription_state().await;
    Json(SubscriptionResponse::from(&sub))
}

/// POST /api/v1/subscription/refresh
pub async fn refresh_subscription(
    State(state): State<AppState>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let start = Instant::now();

    let result = state.storefront.refresh().await;
    record_op_duration("refresh", start, result.is_ok());

    Ok(Json(SubscriptionResponse::from(&result?)))
}

/// GET /api/v1/offerings
pub async fn get_offerings(State(state): State<AppState>) -> ApiResult<Json<OfferingsResponse>> {
    let start = Instant::now();

    let result = state.storefront.offerings().await;
    record_op_duration("offerings", start, result.is_ok());

    Ok(Json(OfferingsResponse { offerings: result? }))
}

/// GET /api/v1/passes/count
pub async fn get_pass_count(State(state): State<AppState>) -> Json<PassCountResponse> {
    Json(PassCountResponse {
        purchased: state.storefront.daily_passes_purchased_count().await,
    })
}
