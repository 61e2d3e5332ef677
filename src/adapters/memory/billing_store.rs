//! In-memory billing store.
//!
//! One shared state behind all three repository ports so that cross-table
//! queries (completed payments without a subscription) behave like the
//! Postgres adapter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::billing::{MemberPlan, Payment, PlanTier, Subscription};
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp, UserId};
use crate::ports::{MemberPlanRepository, PaymentRepository, SaveResult, SubscriptionRepository};

#[derive(Default)]
struct StoreState {
    payments: Vec<Payment>,
    subscriptions: Vec<Subscription>,
    members: HashMap<UserId, MemberPlan>,
    fail_subscription_inserts: bool,
    fail_plan_updates: bool,
}

/// Thread-safe in-memory implementation of the billing repositories.
#[derive(Clone, Default)]
pub struct InMemoryBillingStore {
    inner: Arc<Mutex<StoreState>>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, DomainError> {
        self.inner
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "billing store lock poisoned"))
    }

    /// Registers an account on the free plan.
    pub fn add_member(&self, user_id: UserId) {
        if let Ok(mut state) = self.state() {
            state
                .members
                .insert(user_id.clone(), MemberPlan::free(user_id, Timestamp::now()));
        }
    }

    /// Makes subscription inserts fail, simulating a crash after payment completion.
    pub fn fail_subscription_inserts(&self, fail: bool) {
        if let Ok(mut state) = self.state() {
            state.fail_subscription_inserts = fail;
        }
    }

    pub fn fail_plan_updates(&self, fail: bool) {
        if let Ok(mut state) = self.state() {
            state.fail_plan_updates = fail;
        }
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.state().map(|s| s.payments.clone()).unwrap_or_default()
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.state().map(|s| s.subscriptions.clone()).unwrap_or_default()
    }

    pub fn member(&self, user_id: &UserId) -> Option<MemberPlan> {
        self.state().ok().and_then(|s| s.members.get(user_id).cloned())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryBillingStore {
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut state = self.state()?;
        if state
            .payments
            .iter()
            .any(|p| p.gateway_order_id == payment.gateway_order_id)
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateOrder,
                format!("Order {} already recorded", payment.gateway_order_id),
            ));
        }
        state.payments.push(payment.clone());
        Ok(())
    }

    async fn complete_pending(
        &self,
        user_id: &UserId,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        now: Timestamp,
    ) -> Result<Option<Payment>, DomainError> {
        let mut state = self.state()?;
        let Some(payment) = state.payments.iter_mut().find(|p| {
            p.is_owned_by(user_id) && p.gateway_order_id == gateway_order_id && p.is_pending()
        }) else {
            return Ok(None);
        };
        payment.complete(gateway_payment_id, now)?;
        Ok(Some(payment.clone()))
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let state = self.state()?;
        Ok(state
            .payments
            .iter()
            .find(|p| p.gateway_order_id == gateway_order_id)
            .cloned())
    }

    async fn mark_plan_applied(&self, id: &PaymentId, now: Timestamp) -> Result<(), DomainError> {
        let mut state = self.state()?;
        match state.payments.iter_mut().find(|p| &p.id == id) {
            Some(payment) if payment.is_completed() => Ok(payment.mark_plan_applied(now)?),
            _ => Ok(()),
        }
    }

    async fn find_awaiting_activation(&self, limit: u32) -> Result<Vec<Payment>, DomainError> {
        let state = self.state()?;
        let mut waiting: Vec<Payment> = state
            .payments
            .iter()
            .filter(|p| p.awaits_activation())
            .cloned()
            .collect();
        waiting.sort_by_key(|p| p.updated_at);
        waiting.truncate(limit as usize);
        Ok(waiting)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryBillingStore {
    async fn insert_for_payment(
        &self,
        subscription: &Subscription,
    ) -> Result<SaveResult, DomainError> {
        let mut state = self.state()?;
        if state.fail_subscription_inserts {
            return Err(DomainError::database("Simulated subscription insert failure"));
        }
        if let Some(existing) = state
            .subscriptions
            .iter()
            .find(|s| s.payment_id == subscription.payment_id)
        {
            return Ok(SaveResult::AlreadyExists(existing.clone()));
        }
        state.subscriptions.push(subscription.clone());
        Ok(SaveResult::Inserted(subscription.clone()))
    }

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Subscription>, DomainError> {
        let state = self.state()?;
        Ok(state
            .subscriptions
            .iter()
            .find(|s| &s.payment_id == payment_id)
            .cloned())
    }
}

#[async_trait]
impl MemberPlanRepository for InMemoryBillingStore {
    async fn set_plan(
        &self,
        user_id: &UserId,
        plan: PlanTier,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut state = self.state()?;
        if state.fail_plan_updates {
            return Err(DomainError::database("Simulated plan update failure"));
        }
        match state.members.get_mut(user_id) {
            Some(member) => {
                member.plan = plan;
                member.plan_expires_at = Some(expires_at);
                member.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
