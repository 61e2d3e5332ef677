//! HTTP handlers for payment endpoints.
//!
//! These handlers connect axum routes to the billing command handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::billing::{
    CreateOrderCommand, CreateOrderHandler, VerifyPaymentCommand, VerifyPaymentHandler,
};
use crate::domain::billing::BillingError;

use super::dto::{
    CreateOrderRequest, CreateOrderResponse, ErrorResponse, VerifyPaymentRequest,
    VerifyPaymentResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for payment routes.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub create_order: Arc<CreateOrderHandler>,
    pub verify_payment: Arc<VerifyPaymentHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/create-order
pub async fn create_order(
    RequireAuth(user): RequireAuth,
    State(state): State<PaymentsAppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let Json(request) = payload?;

    let cmd = CreateOrderCommand::new(user, &request.plan_type)?;
    let result = state.create_order.handle(cmd).await?;

    Ok(Json(CreateOrderResponse::from(result)))
}

/// POST /api/payments/verify
pub async fn verify_payment(
    RequireAuth(user): RequireAuth,
    State(state): State<PaymentsAppState>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let Json(request) = payload?;

    let cmd = VerifyPaymentCommand::new(
        user,
        request.gateway_order_id,
        request.gateway_payment_id,
        request.gateway_signature,
    )?;
    let result = state.verify_payment.handle(cmd).await?;

    Ok(Json(VerifyPaymentResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for BillingApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(BillingError::validation("body", rejection.body_text()))
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            BillingError::InvalidPlan(_)
            | BillingError::ValidationFailed { .. }
            | BillingError::InvalidSignature => StatusCode::BAD_REQUEST,
            BillingError::PaymentNotFound => StatusCode::NOT_FOUND,
            BillingError::Gateway { .. } | BillingError::Infrastructure(_) => {
                tracing::error!(error = %self.0, "Payment request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: BillingError) -> (StatusCode, serde_json::Value) {
        let response = BillingApiError::from(err).into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_are_400() {
        let (status, body) = render(BillingError::invalid_plan("Gold")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid plan type");
        assert_eq!(body["code"], "INVALID_PLAN");

        let (status, body) = render(BillingError::invalid_signature()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid payment signature");

        let (status, _) = render(BillingError::validation("planType", "missing")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = render(BillingError::payment_not_found()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Payment not found");
        assert_eq!(body["code"], "PAYMENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let (status, body) =
            render(BillingError::gateway("connection refused to api.razorpay.com", true)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = render(BillingError::infrastructure("pool timed out")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("pool"));
    }
}
