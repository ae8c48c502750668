//! Shared handler utilities
//!
//! Common validation, metrics, and response types used across handlers.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use skapto_types::{Subscription, Workshop};

use crate::error::ApiError;

// ============================================================================
// Input Validation
// ============================================================================

/// Maximum length for store identifiers (package ids, product ids)
const MAX_IDENTIFIER_LEN: usize = 100;

/// Maximum length for user-provided strings
const MAX_STRING_LEN: usize = 256;

/// Maximum length of a store receipt / purchase token
const MAX_FETCH_TOKEN_LEN: usize = 64 * 1024;

/// Validate a package or product identifier.
///
/// # Security
/// Identifiers end up in metric labels and provider URLs.
/// - Allows: alphanumeric, `_`, `-`, `.`, and a leading `$` (RevenueCat
///   reserved packages such as `$rc_monthly`)
///
/// # Example
/// ```ignore
/// validate_identifier("$rc_monthly", "package_identifier")?;  // Ok
/// validate_identifier("day_pass", "package_identifier")?;     // Ok
/// validate_identifier("foo/../bar", "package_identifier")?;   // Err
/// ```
pub fn validate_identifier(value: &str, field_name: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field_name} cannot be empty")));
    }

    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ApiError::BadRequest(format!(
            "{field_name} too long (max {MAX_IDENTIFIER_LEN} chars)"
        )));
    }

    let body = value.strip_prefix('$').unwrap_or(value);
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ApiError::BadRequest(format!(
            "{field_name} contains invalid characters (use alphanumeric, _, -, .)"
        )));
    }

    Ok(())
}

/// Validate a user-provided string is within safe bounds.
pub fn validate_string_length(value: &str, field_name: &str) -> Result<(), ApiError> {
    if value.len() > MAX_STRING_LEN {
        return Err(ApiError::BadRequest(format!(
            "{field_name} too long (max {MAX_STRING_LEN} chars)"
        )));
    }
    Ok(())
}

/// Validate a store receipt.
pub fn validate_fetch_token(token: &str) -> Result<(), ApiError> {
    if token.trim().is_empty() {
        return Err(ApiError::BadRequest("fetch_token cannot be empty".into()));
    }
    if token.len() > MAX_FETCH_TOKEN_LEN {
        return Err(ApiError::BadRequest(format!(
            "fetch_token too long (max {MAX_FETCH_TOKEN_LEN} bytes)"
        )));
    }
    Ok(())
}

/// Validate a workshop record supplied by the catalog.
pub fn validate_workshop(workshop: &Workshop) -> Result<(), ApiError> {
    if workshop.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title cannot be empty".into()));
    }
    validate_string_length(&workshop.title, "title")?;
    validate_string_length(&workshop.instructor, "instructor")?;
    validate_string_length(&workshop.age_range, "age_range")?;

    if workshop.spots_available > workshop.max_participants {
        return Err(ApiError::BadRequest(
            "spots_available cannot exceed max_participants".into(),
        ));
    }

    Ok(())
}

// ============================================================================
// Metrics Helpers
// ============================================================================

/// Record HTTP operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "storefront_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub is_active: bool,
    pub plan: Option<String>,
    pub plan_name: Option<&'static str>,
    pub expires_at: Option<DateTime<Utc>>,
    pub remaining_visits: u32,
    pub status_text: String,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(sub: &Subscription) -> Self {
        Self {
            is_active: sub.is_active(),
            plan: sub.plan().map(|p| p.to_string()),
            plan_name: sub.plan().map(|p| p.display_name()),
            expires_at: sub.expires_at(),
            remaining_visits: sub.remaining_visits(),
            status_text: sub.status_text(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
