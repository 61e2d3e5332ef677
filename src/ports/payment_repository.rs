//! Payment repository port.

use async_trait::async_trait;

use crate::domain::billing::Payment;
use crate::domain::foundation::{DomainError, PaymentId, Timestamp, UserId};

/// Persistence for purchase attempts.
///
/// `complete_pending` is the serialization point for concurrent verify
/// calls: of any number of racing callers, at most one gets `Some`.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new payment.
    ///
    /// Fails with `DuplicateOrder` if the gateway order id is already stored.
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Conditionally complete the caller's pending payment for an order.
    ///
    /// Matches on user id, gateway order id and `status = pending` in one
    /// atomic step. Returns the updated payment, or `None` when nothing matched.
    async fn complete_pending(
        &self,
        user_id: &UserId,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        now: Timestamp,
    ) -> Result<Option<Payment>, DomainError>;

    /// Find a payment by gateway order id, whoever owns it.
    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// Record that activation finished. Idempotent; keeps the first timestamp.
    async fn mark_plan_applied(&self, id: &PaymentId, now: Timestamp) -> Result<(), DomainError>;

    /// Completed payments whose activation never finished, oldest first.
    ///
    /// Covers a missing subscription as well as a plan update that did not land.
    async fn find_awaiting_activation(&self, limit: u32) -> Result<Vec<Payment>, DomainError>;
}
