//! Billing error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidPlan | 400 |
//! | ValidationFailed | 400 |
//! | InvalidSignature | 400 |
//! | PaymentNotFound | 404 |
//! | Gateway | 500 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors surfaced by the billing use cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// Requested plan is unknown or not purchasable.
    InvalidPlan(String),

    /// Request input failed validation.
    ValidationFailed { field: String, message: String },

    /// Completion claim does not carry a valid gateway signature.
    InvalidSignature,

    /// No pending payment matches the caller and order.
    ///
    /// Deliberately carries no detail; the cause is logged instead.
    PaymentNotFound,

    /// Payment gateway rejected or could not be reached.
    Gateway { message: String, retryable: bool },

    /// Storage or other internal failure.
    Infrastructure(String),
}

impl BillingError {
    pub fn invalid_plan(plan: impl Into<String>) -> Self {
        BillingError::InvalidPlan(plan.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_signature() -> Self {
        BillingError::InvalidSignature
    }

    pub fn payment_not_found() -> Self {
        BillingError::PaymentNotFound
    }

    pub fn gateway(message: impl Into<String>, retryable: bool) -> Self {
        BillingError::Gateway {
            message: message.into(),
            retryable,
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::InvalidPlan(_) => ErrorCode::InvalidPlan,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::InvalidSignature => ErrorCode::InvalidSignature,
            BillingError::PaymentNotFound => ErrorCode::PaymentNotFound,
            BillingError::Gateway { .. } => ErrorCode::GatewayError,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Message safe to return to the caller.
    pub fn message(&self) -> String {
        match self {
            BillingError::InvalidPlan(_) => "Invalid plan type".to_string(),
            BillingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BillingError::InvalidSignature => "Invalid payment signature".to_string(),
            BillingError::PaymentNotFound => "Payment not found".to_string(),
            BillingError::Gateway { .. } | BillingError::Infrastructure(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            BillingError::Gateway { retryable, .. } => *retryable,
            BillingError::Infrastructure(_) => true,
            _ => false,
        }
    }

    /// Returns true for failures the caller caused.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            BillingError::Gateway { .. } | BillingError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingError::InvalidPlan(plan) => write!(f, "Invalid plan type: {}", plan),
            BillingError::Gateway { message, .. } => write!(f, "Gateway error: {}", message),
            BillingError::Infrastructure(message) => write!(f, "Infrastructure error: {}", message),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => BillingError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::InvalidPlan => BillingError::InvalidPlan(err.message),
            ErrorCode::InvalidSignature => BillingError::InvalidSignature,
            ErrorCode::PaymentNotFound => BillingError::PaymentNotFound,
            ErrorCode::GatewayError => BillingError::Gateway {
                message: err.message,
                retryable: false,
            },
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        BillingError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
