//! Axum router configuration for payment endpoints.

use axum::{routing::post, Router};

use super::handlers::{create_order, verify_payment, PaymentsAppState};

/// Payment routes, mounted at `/api/payments`.
///
/// Both routes require an authenticated caller.
/// - `POST /create-order` - Open a gateway order for a plan
/// - `POST /verify` - Verify a checkout completion and activate the plan
pub fn payments_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify", post(verify_payment))
}
