//! Payment gateway port for order creation.
//!
//! The gateway only opens orders here. Completion is proven by the
//! signature the checkout widget returns, never by anything the gateway
//! says at order time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Port for the external payment gateway.
///
/// `create_order` must be safe to call twice with the same receipt; the
/// order-creation use case retries once on retryable errors.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open an order the customer can pay against.
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, PaymentError>;

    /// Publishable key id handed to the checkout widget.
    fn public_key(&self) -> &str;
}

/// Request to open a gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in the currency's smallest unit.
    pub amount: i64,
    pub currency: String,
    /// Merchant reference, unique per purchase attempt.
    pub receipt: String,
    pub notes: OrderNotes,
}

/// Metadata linking the order back to the purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub user_id: String,
    pub plan_type: String,
}

/// Order as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in the currency's smallest unit.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Gateway error with retry classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Gateway's own error code, when it sent one.
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Timeout, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::RateLimitExceeded, message)
    }

    /// Gateway-side failure (5xx).
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderUnavailable, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let mut domain = DomainError::new(ErrorCode::GatewayError, err.message)
            .with_detail("gateway_code", err.code.to_string());
        if let Some(provider_code) = err.provider_code {
            domain = domain.with_detail("provider_code", provider_code);
        }
        domain
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Connection could not be established or was dropped.
    NetworkError,

    /// No response within the configured deadline.
    Timeout,

    /// API credentials rejected.
    AuthenticationError,

    /// Gateway refused the request as malformed.
    InvalidRequest,

    RateLimitExceeded,

    /// Gateway returned a server error.
    ProviderUnavailable,

    /// Any other gateway-reported failure.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::Timeout
                | PaymentErrorCode::RateLimitExceeded
                | PaymentErrorCode::ProviderUnavailable
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::Timeout => "timeout",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderUnavailable => "provider_unavailable",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_codes_are_retryable() {
        assert!(PaymentError::network("reset").retryable);
        assert!(PaymentError::timeout("10s").retryable);
        assert!(PaymentError::rate_limited("slow down").retryable);
        assert!(PaymentError::unavailable("502").retryable);
    }

    #[test]
    fn caller_faults_are_not_retryable() {
        assert!(!PaymentError::authentication("bad key").retryable);
        assert!(!PaymentError::invalid_request("amount").retryable);
        assert!(!PaymentError::provider("odd").retryable);
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = PaymentError::timeout("no response after 10s");
        assert_eq!(err.to_string(), "timeout: no response after 10s");
    }

    #[test]
    fn converts_to_gateway_domain_error_with_details() {
        let err = PaymentError::invalid_request("amount too small").with_provider_code("BAD_REQUEST_ERROR");
        let domain: DomainError = err.into();

        assert_eq!(domain.code, ErrorCode::GatewayError);
        assert_eq!(domain.details.get("gateway_code"), Some(&"invalid_request".to_string()));
        assert_eq!(
            domain.details.get("provider_code"),
            Some(&"BAD_REQUEST_ERROR".to_string())
        );
    }

    #[test]
    fn order_notes_serialize_camel_case() {
        let notes = OrderNotes {
            user_id: "u1".to_string(),
            plan_type: "Elite".to_string(),
        };
        let json = serde_json::to_value(&notes).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["planType"], "Elite");
    }

    #[test]
    fn gateway_order_tolerates_missing_optional_fields() {
        let order: GatewayOrder =
            serde_json::from_str(r#"{"id":"order_1","amount":299900,"currency":"INR"}"#).unwrap();
        assert_eq!(order.id, "order_1");
        assert!(order.receipt.is_none());
    }

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }
}
