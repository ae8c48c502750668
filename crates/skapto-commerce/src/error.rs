//! Commerce errors

use thiserror::Error;

/// Commerce provider errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Provider unreachable (connect failure, timeout, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Credentials rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The customer backed out of the purchase
    #[error("purchase cancelled")]
    PurchaseCancelled,

    /// The store declined the payment
    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    /// Requested package or product is unknown
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Provider answered with something we could not parse
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Any other provider-side failure
    #[error("provider error ({status}): {message}")]
    Provider {
        /// HTTP status
        status: u16,
        /// Provider message
        message: String,
    },
}

/// Provider operation an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommerceOperation {
    /// Customer info refresh
    FetchCustomerInfo,
    /// Purchase
    Purchase,
    /// Restore purchases
    Restore,
    /// Offerings lookup
    LoadOfferings,
}

impl CommerceOperation {
    const fn failure_prefix(self) -> &'static str {
        match self {
            Self::FetchCustomerInfo => "Failed to check subscription",
            Self::Purchase => "Purchase failed",
            Self::Restore => "Restore failed",
            Self::LoadOfferings => "Failed to load offerings",
        }
    }
}

impl CommerceError {
    /// Check if this is a transport or auth failure
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unauthorized(_))
    }

    /// Check if the customer or the store stopped a purchase
    pub fn is_purchase_failure(&self) -> bool {
        matches!(self, Self::PurchaseCancelled | Self::PaymentDeclined(_))
    }

    /// Message suitable for the presentation layer
    pub fn user_message(&self, operation: CommerceOperation) -> String {
        format!("{}: {self}", operation.failure_prefix())
    }

    /// Error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "COMMERCE_UNAVAILABLE",
            Self::Unauthorized(_) => "COMMERCE_UNAUTHORIZED",
            Self::PurchaseCancelled => "PURCHASE_CANCELLED",
            Self::PaymentDeclined(_) => "PAYMENT_DECLINED",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::InvalidResponse(_) | Self::Provider { .. } => "COMMERCE_ERROR",
        }
    }
}
