//! End-to-end tests for the payment routes.
//!
//! Drives the full router (auth middleware, JSON extraction, error mapping)
//! over in-memory repositories, the mock gateway and the mock session
//! validator. No network or database is involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use pulsefit::adapters::http::middleware::AuthState;
use pulsefit::adapters::http::{app_router, PaymentsAppState};
use pulsefit::adapters::razorpay::MOCK_KEY_ID;
use pulsefit::adapters::{InMemoryBillingStore, MockPaymentGateway, MockSessionValidator};
use pulsefit::application::handlers::billing::{
    ActivatePaymentHandler, CreateOrderHandler, SubscriptionGranter, VerifyPaymentHandler,
};
use pulsefit::config::ServerConfig;
use pulsefit::domain::billing::{PaymentSignatureVerifier, PaymentStatus, PlanCatalog, PlanTier};
use pulsefit::domain::foundation::UserId;

const KEY_SECRET: &str = "rzp_integration_secret";
const MEMBER_TOKEN: &str = "member-token";
const MEMBER_ID: &str = "member-1";
const OTHER_TOKEN: &str = "other-token";
const OTHER_ID: &str = "member-2";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    store: InMemoryBillingStore,
    gateway: MockPaymentGateway,
}

impl TestApp {
    fn new() -> Self {
        Self::with_gateway(MockPaymentGateway::new())
    }

    fn with_gateway(gateway: MockPaymentGateway) -> Self {
        let store = InMemoryBillingStore::new();
        store.add_member(UserId::new(MEMBER_ID).unwrap());
        store.add_member(UserId::new(OTHER_ID).unwrap());

        let catalog = Arc::new(PlanCatalog::standard());
        let repo = Arc::new(store.clone());
        let granter = Arc::new(SubscriptionGranter::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            Arc::clone(&catalog),
        ));
        let activation = Arc::new(ActivatePaymentHandler::new(repo.clone(), granter));

        let state = PaymentsAppState {
            create_order: Arc::new(CreateOrderHandler::new(
                Arc::new(gateway.clone()),
                repo,
                catalog,
            )),
            verify_payment: Arc::new(VerifyPaymentHandler::new(
                PaymentSignatureVerifier::new(SecretString::new(KEY_SECRET.to_string())),
                activation,
            )),
        };

        let auth: AuthState = Arc::new(
            MockSessionValidator::new()
                .with_test_user(MEMBER_TOKEN, MEMBER_ID)
                .with_test_user(OTHER_TOKEN, OTHER_ID),
        );

        Self {
            router: app_router(state, auth, &ServerConfig::default()),
            store,
            gateway,
        }
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Body) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(request.body(body).unwrap()).await
    }

    async fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.post(path, token, Body::from(body.to_string())).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create_order(&self, token: &str, plan: &str) -> String {
        let (status, body) = self
            .post_json("/api/payments/create-order", Some(token), json!({ "planType": plan }))
            .await;
        assert_eq!(status, StatusCode::OK, "create-order failed: {}", body);
        body["orderId"].as_str().unwrap().to_string()
    }
}

fn sign(order_id: &str, payment_id: &str) -> String {
    PaymentSignatureVerifier::new(SecretString::new(KEY_SECRET.to_string()))
        .expected_signature(order_id, payment_id)
}

fn verify_body(order_id: &str, payment_id: &str, signature: &str) -> Value {
    json!({
        "gatewayOrderId": order_id,
        "gatewayPaymentId": payment_id,
        "gatewaySignature": signature,
    })
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn premium_purchase_activates_subscription() {
    let app = TestApp::new();

    let (status, order) = app
        .post_json(
            "/api/payments/create-order",
            Some(MEMBER_TOKEN),
            json!({ "planType": "Premium" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["amount"], 499_900);
    assert_eq!(order["currency"], "INR");
    assert_eq!(order["key"], MOCK_KEY_ID);
    let order_id = order["orderId"].as_str().unwrap().to_string();

    let pending = app.store.payments();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, PaymentStatus::Pending);
    assert_eq!(pending[0].amount, 4999);

    let signature = sign(&order_id, "pay_premium_1");
    let (status, body) = app
        .post_json(
            "/api/payments/verify",
            Some(MEMBER_TOKEN),
            verify_body(&order_id, "pay_premium_1", &signature),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "verify failed: {}", body);
    assert_eq!(body["message"], "Payment verified successfully");
    let subscription = &body["subscription"];
    assert_eq!(subscription["userId"], MEMBER_ID);
    assert_eq!(subscription["planType"], "Premium");
    assert_eq!(subscription["status"], "active");
    assert_eq!(subscription["features"]["personalTraining"], true);
    assert_eq!(subscription["features"]["vipAccess"], false);

    let payment = &app.store.payments()[0];
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.gateway_payment_id, "pay_premium_1");
    assert!(payment.plan_applied_at.is_some());

    let member = app.store.member(&UserId::new(MEMBER_ID).unwrap()).unwrap();
    assert_eq!(member.plan, PlanTier::Premium);
    assert_eq!(member.plan_expires_at, Some(payment.plan_end_date));
}

#[tokio::test]
async fn verify_accepts_checkout_widget_field_names() {
    let app = TestApp::new();
    let order_id = app.create_order(MEMBER_TOKEN, "Elite").await;

    let (status, body) = app
        .post_json(
            "/api/payments/verify",
            Some(MEMBER_TOKEN),
            json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": "pay_elite_1",
                "razorpay_signature": sign(&order_id, "pay_elite_1"),
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "verify failed: {}", body);
    assert_eq!(body["subscription"]["planType"], "Elite");
    assert_eq!(body["subscription"]["features"]["vipAccess"], true);
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn tampered_signature_leaves_payment_pending() {
    let app = TestApp::new();
    let order_id = app.create_order(MEMBER_TOKEN, "Basic").await;

    let (status, body) = app
        .post_json(
            "/api/payments/verify",
            Some(MEMBER_TOKEN),
            verify_body(&order_id, "pay_basic_1", &sign(&order_id, "pay_other")),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SIGNATURE");
    assert_eq!(app.store.payments()[0].status, PaymentStatus::Pending);
    assert!(app.store.subscriptions().is_empty());
}

#[tokio::test]
async fn unknown_plan_is_rejected_without_calling_gateway() {
    let app = TestApp::new();

    for plan in ["Platinum", "premium", "Free", ""] {
        let (status, body) = app
            .post_json(
                "/api/payments/create-order",
                Some(MEMBER_TOKEN),
                json!({ "planType": plan }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "plan {:?}", plan);
        assert_eq!(body["code"], "INVALID_PLAN");
    }

    assert_eq!(app.gateway.call_count(), 0);
    assert!(app.store.payments().is_empty());
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/payments/create-order", None, json!({ "planType": "Basic" }))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/payments/create-order",
            Some("forged-token"),
            json!({ "planType": "Basic" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(app.gateway.call_count(), 0);
}

#[tokio::test]
async fn replayed_verification_is_not_found() {
    let app = TestApp::new();
    let order_id = app.create_order(MEMBER_TOKEN, "Premium").await;
    let body = verify_body(&order_id, "pay_once", &sign(&order_id, "pay_once"));

    let (first, _) = app
        .post_json("/api/payments/verify", Some(MEMBER_TOKEN), body.clone())
        .await;
    let (second, error) = app
        .post_json("/api/payments/verify", Some(MEMBER_TOKEN), body)
        .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "PAYMENT_NOT_FOUND");
    assert_eq!(app.store.subscriptions().len(), 1);
}

#[tokio::test]
async fn another_members_order_is_not_found() {
    let app = TestApp::new();
    let order_id = app.create_order(MEMBER_TOKEN, "Premium").await;

    let (status, body) = app
        .post_json(
            "/api/payments/verify",
            Some(OTHER_TOKEN),
            verify_body(&order_id, "pay_stolen", &sign(&order_id, "pay_stolen")),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Payment not found");
    assert_eq!(app.store.payments()[0].status, PaymentStatus::Pending);

    let other = app.store.member(&UserId::new(OTHER_ID).unwrap()).unwrap();
    assert_eq!(other.plan, PlanTier::Free);
}

#[tokio::test]
async fn concurrent_verifications_activate_once() {
    let app = TestApp::new();
    let order_id = app.create_order(MEMBER_TOKEN, "Premium").await;
    let body = verify_body(&order_id, "pay_race", &sign(&order_id, "pay_race"));

    let attempts = (0..4).map(|_| {
        app.post_json("/api/payments/verify", Some(MEMBER_TOKEN), body.clone())
    });
    let results = futures::future::join_all(attempts).await;

    let succeeded = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::OK)
        .count();
    let not_found = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::NOT_FOUND)
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(not_found, 3);
    assert_eq!(app.store.subscriptions().len(), 1);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/payments/create-order",
            Some(MEMBER_TOKEN),
            Body::from("{\"planType\": "),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn missing_verify_fields_are_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/payments/verify",
            Some(MEMBER_TOKEN),
            json!({ "gatewayOrderId": "order_mock_1" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn gateway_outage_is_internal_error_without_payment() {
    let app = TestApp::with_gateway(MockPaymentGateway::failing(
        pulsefit::ports::PaymentError::unavailable("gateway down"),
    ));

    let (status, body) = app
        .post_json(
            "/api/payments/create-order",
            Some(MEMBER_TOKEN),
            json!({ "planType": "Basic" }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(app.store.payments().is_empty());
}

// =============================================================================
// Public Routes
// =============================================================================

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}
