//! Access errors

use skapto_commerce::{CommerceError, CommerceOperation};
use skapto_store::StoreError;
use thiserror::Error;

/// Storefront access errors
#[derive(Error, Debug)]
pub enum AccessError {
    /// Commerce provider call failed
    #[error("{}", user_message(.source, .operation))]
    Commerce {
        /// Operation that failed
        operation: CommerceOperation,
        /// Provider error
        #[source]
        source: CommerceError,
    },

    /// The consumption ledger could not be written
    #[error("ledger error: {0}")]
    Ledger(#[from] StoreError),

    /// A pass booking was authorized but no transaction backs it
    #[error("no purchase transaction backs the single visit pass")]
    MissingPassTransaction,

    /// The pass transaction was consumed by another booking
    #[error("single visit pass already redeemed")]
    PassAlreadyRedeemed,

    /// Requested package is not in any offering
    #[error("package not found: {0}")]
    PackageNotFound(String),
}

fn user_message(source: &CommerceError, operation: &CommerceOperation) -> String {
    source.user_message(*operation)
}

impl AccessError {
    /// Wrap a provider error with the operation it came from
    pub fn commerce(operation: CommerceOperation, source: CommerceError) -> Self {
        Self::Commerce { operation, source }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Commerce { source, .. } => match source {
                CommerceError::Transport(_) => 503,
                CommerceError::Unauthorized(_)
                | CommerceError::InvalidResponse(_)
                | CommerceError::Provider { .. } => 502,
                CommerceError::PurchaseCancelled => 409,
                CommerceError::PaymentDeclined(_) => 402,
                CommerceError::ProductNotFound(_) => 404,
            },
            Self::Ledger(_) => 500,
            Self::MissingPassTransaction | Self::PassAlreadyRedeemed => 409,
            Self::PackageNotFound(_) => 404,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Commerce { source, .. } => source.error_code(),
            Self::Ledger(_) => "LEDGER_ERROR",
            Self::MissingPassTransaction => "MISSING_PASS_TRANSACTION",
            Self::PassAlreadyRedeemed => "PASS_ALREADY_REDEEMED",
            Self::PackageNotFound(_) => "PACKAGE_NOT_FOUND",
        }
    }
}
