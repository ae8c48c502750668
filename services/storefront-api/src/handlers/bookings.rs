//! Booking handlers
//!
//! Workshops come from the catalog service; clients pass the record they
//! are booking in the request body.
//!
//! The authorizer takes `requires_membership` and `spots_available` at face
//! value. Deploy behind a gateway that fills the workshop from the trusted
//! catalog, never from end-user input.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use skapto_access::BookingDecision;
use skapto_types::Workshop;

use crate::error::ApiResult;
use crate::handlers::shared::{record_op_duration, validate_workshop, SubscriptionResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub workshop: Workshop,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub can_book: bool,
    pub decision: BookingDecision,
    pub workshop_full: bool,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booked: bool,
    pub decision: BookingDecision,
    pub workshop_full: bool,
    pub subscription: SubscriptionResponse,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/bookings/eligibility
pub async fn check_eligibility(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> ApiResult<Json<EligibilityResponse>> {
    validate_workshop(&req.workshop)?;

    let sub = state.storefront.subscription_state().await;
    let decision = skapto_access::decide(&sub, &req.workshop);

    Ok(Json(EligibilityResponse {
        can_book: decision.is_allowed(),
        decision,
        workshop_full: !req.workshop.has_capacity(),
    }))
}

/// POST /api/v1/bookings
pub async fn book_workshop(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> ApiResult<Json<BookingResponse>> {
    let start = Instant::now();

    validate_workshop(&req.workshop)?;

    let result = state.storefront.book_workshop(&req.workshop).await;
    record_op_duration("book_workshop", start, result.is_ok());
    let outcome = result?;

    tracing::info!(
        workshop_id = %req.workshop.id,
        booked = outcome.booked,
        decision = outcome.decision.as_str(),
        "Booking attempt handled"
    );

    let sub = state.storefront.subscription_state().await;
    Ok(Json(BookingResponse {
        booked: outcome.booked,
        decision: outcome.decision,
        workshop_full: outcome.workshop_full,
        subscription: SubscriptionResponse::from(&sub),
    }))
}
