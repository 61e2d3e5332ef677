//! HTTP DTOs for payment endpoints.
//!
//! Field names are camelCase on the wire to match the checkout client.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{ActivatePaymentResult, CreateOrderResult};
use crate::domain::billing::{EntitlementBundle, PlanTier, Subscription, SubscriptionStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to open an order for a plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Plan name, case-sensitive (`Basic`, `Premium`, `Elite`).
    #[serde(default)]
    pub plan_type: String,
}

/// Completion claim posted after checkout.
///
/// The checkout widget hands back `razorpay_*` keys; those are accepted as
/// aliases so the client can forward them unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default, alias = "razorpay_order_id")]
    pub gateway_order_id: String,
    #[serde(default, alias = "razorpay_payment_id")]
    pub gateway_payment_id: String,
    #[serde(default, alias = "razorpay_signature")]
    pub gateway_signature: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// What the checkout widget needs to open the payment sheet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    /// Publishable gateway key id.
    pub key: String,
}

impl From<CreateOrderResult> for CreateOrderResponse {
    fn from(result: CreateOrderResult) -> Self {
        Self {
            order_id: result.order_id,
            amount: result.amount,
            currency: result.currency,
            key: result.key,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub id: String,
    pub user_id: String,
    pub plan_type: PlanTier,
    pub status: SubscriptionStatus,
    pub start_date: String,
    pub end_date: String,
    pub auto_renew: bool,
    pub payment_id: String,
    pub features: EntitlementBundle,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Subscription> for SubscriptionView {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id.to_string(),
            user_id: sub.user_id.to_string(),
            plan_type: sub.plan_type,
            status: sub.status,
            start_date: sub.start_date.to_rfc3339(),
            end_date: sub.end_date.to_rfc3339(),
            auto_renew: sub.auto_renew,
            payment_id: sub.payment_id.to_string(),
            features: sub.features,
            created_at: sub.created_at.to_rfc3339(),
            updated_at: sub.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub message: String,
    pub subscription: SubscriptionView,
}

impl From<ActivatePaymentResult> for VerifyPaymentResponse {
    fn from(result: ActivatePaymentResult) -> Self {
        Self {
            message: "Payment verified successfully".to_string(),
            subscription: result.subscription.into(),
        }
    }
}

/// Error body: `{error, code}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Stable code for programmatic handling.
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_request_accepts_camel_case() {
        let req: VerifyPaymentRequest = serde_json::from_str(
            r#"{"gatewayOrderId":"order_1","gatewayPaymentId":"pay_1","gatewaySignature":"ab"}"#,
        )
        .unwrap();
        assert_eq!(req.gateway_order_id, "order_1");
        assert_eq!(req.gateway_payment_id, "pay_1");
        assert_eq!(req.gateway_signature, "ab");
    }

    #[test]
    fn verify_request_accepts_gateway_native_keys() {
        let req: VerifyPaymentRequest = serde_json::from_str(
            r#"{"razorpay_order_id":"order_1","razorpay_payment_id":"pay_1","razorpay_signature":"ab"}"#,
        )
        .unwrap();
        assert_eq!(req.gateway_order_id, "order_1");
        assert_eq!(req.gateway_payment_id, "pay_1");
        assert_eq!(req.gateway_signature, "ab");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: VerifyPaymentRequest = serde_json::from_str("{}").unwrap();
        assert!(req.gateway_order_id.is_empty());

        let req: CreateOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(req.plan_type.is_empty());
    }

    #[test]
    fn create_order_response_is_camel_case() {
        let resp = CreateOrderResponse {
            order_id: "order_1".to_string(),
            amount: 499_900,
            currency: "INR".to_string(),
            key: "rzp_test_key".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["orderId"], "order_1");
        assert_eq!(json["amount"], 499_900);
        assert_eq!(json["key"], "rzp_test_key");
    }

    #[test]
    fn error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::new("INVALID_PLAN", "Invalid plan type"))
            .unwrap();
        assert_eq!(json, serde_json::json!({"error": "Invalid plan type", "code": "INVALID_PLAN"}));
    }
}
