//! Mock payment gateway for testing.
//!
//! Supports:
//! - Deterministic order ids (`order_mock_1`, `order_mock_2`, ...)
//! - Receipt idempotency, like the real gateway
//! - Queued error injection
//! - Request tracking

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{CreateOrderRequest, GatewayOrder, PaymentError, PaymentGateway};

/// Key id the mock reports to the checkout widget.
pub const MOCK_KEY_ID: &str = "rzp_test_mock";

/// Mock gateway for tests.
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.fail_next(PaymentError::timeout("slow"));
/// let order = gateway.create_order(request).await?; // retried by the caller
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    orders_by_receipt: HashMap<String, GatewayOrder>,
    queued_errors: VecDeque<PaymentError>,
    permanent_error: Option<PaymentError>,
    requests: Vec<CreateOrderRequest>,
    issued: u64,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call fails with `error`.
    pub fn failing(error: PaymentError) -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().permanent_error = Some(error);
        mock
    }

    /// Fail the next call with `error`; later calls succeed.
    pub fn fail_next(&self, error: PaymentError) {
        self.inner.lock().unwrap().queued_errors.push_back(error);
    }

    /// Every request received, including failed ones.
    pub fn requests(&self) -> Vec<CreateOrderRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    /// Distinct orders actually opened.
    pub fn orders_opened(&self) -> usize {
        self.inner.lock().unwrap().orders_by_receipt.len()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, PaymentError> {
        let mut state = self.inner.lock().unwrap();
        state.requests.push(request.clone());

        if let Some(err) = state.permanent_error.clone() {
            return Err(err);
        }
        if let Some(err) = state.queued_errors.pop_front() {
            return Err(err);
        }

        if let Some(existing) = state.orders_by_receipt.get(&request.receipt) {
            return Ok(existing.clone());
        }

        state.issued += 1;
        let order = GatewayOrder {
            id: format!("order_mock_{}", state.issued),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: Some("created".to_string()),
        };
        state
            .orders_by_receipt
            .insert(request.receipt, order.clone());
        Ok(order)
    }

    fn public_key(&self) -> &str {
        MOCK_KEY_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::OrderNotes;

    fn request(receipt: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            amount: 299_900,
            currency: "INR".to_string(),
            receipt: receipt.to_string(),
            notes: OrderNotes {
                user_id: "u1".to_string(),
                plan_type: "Basic".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn issues_sequential_order_ids() {
        let gateway = MockPaymentGateway::new();
        let a = gateway.create_order(request("r1")).await.unwrap();
        let b = gateway.create_order(request("r2")).await.unwrap();

        assert_eq!(a.id, "order_mock_1");
        assert_eq!(b.id, "order_mock_2");
        assert_eq!(a.amount, 299_900);
    }

    #[tokio::test]
    async fn same_receipt_returns_same_order() {
        let gateway = MockPaymentGateway::new();
        let a = gateway.create_order(request("r1")).await.unwrap();
        let b = gateway.create_order(request("r1")).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(gateway.orders_opened(), 1);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn queued_error_affects_one_call() {
        let gateway = MockPaymentGateway::new();
        gateway.fail_next(PaymentError::timeout("slow"));

        assert!(gateway.create_order(request("r1")).await.is_err());
        assert!(gateway.create_order(request("r1")).await.is_ok());
    }

    #[tokio::test]
    async fn failing_gateway_always_errors() {
        let gateway = MockPaymentGateway::failing(PaymentError::authentication("bad key"));
        assert!(gateway.create_order(request("r1")).await.is_err());
        assert!(gateway.create_order(request("r2")).await.is_err());
        assert_eq!(gateway.orders_opened(), 0);
    }

    #[test]
    fn reports_mock_key() {
        assert_eq!(MockPaymentGateway::new().public_key(), MOCK_KEY_ID);
    }
}
