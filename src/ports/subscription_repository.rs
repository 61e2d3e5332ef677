//! Subscription repository port.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, PaymentId};

/// Result of an idempotent subscription insert.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveResult {
    /// First subscription for this payment.
    Inserted(Subscription),
    /// A subscription for this payment was already stored; it is returned as-is.
    AlreadyExists(Subscription),
}

impl SaveResult {
    pub fn was_inserted(&self) -> bool {
        matches!(self, SaveResult::Inserted(_))
    }

    pub fn into_subscription(self) -> Subscription {
        match self {
            SaveResult::Inserted(sub) | SaveResult::AlreadyExists(sub) => sub,
        }
    }
}

/// Persistence for activated subscriptions.
///
/// Implementations must enforce one subscription per payment (unique
/// `payment_id`), so activation can be replayed safely.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert unless the payment already has a subscription.
    async fn insert_for_payment(&self, subscription: &Subscription)
        -> Result<SaveResult, DomainError>;

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Subscription>, DomainError>;
}
