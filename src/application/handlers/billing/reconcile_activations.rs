//! ReconcileActivationsHandler - finishes activations that were cut short.
//!
//! A crash or storage failure anywhere after payment completion leaves a
//! completed payment whose activation never got marked: the subscription
//! may be missing, or it exists but the member's plan was never updated.
//! This handler finds those and re-runs the grant step. Safe to run at any
//! time and any number of times.

use std::sync::Arc;

use crate::domain::billing::BillingError;
use crate::ports::PaymentRepository;

use super::SubscriptionGranter;

/// Default number of payments examined per run.
pub const DEFAULT_RECONCILE_BATCH: u32 = 100;

#[derive(Debug, Clone, Copy)]
pub struct ReconcileActivationsCommand {
    pub batch_size: u32,
}

impl Default for ReconcileActivationsCommand {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_RECONCILE_BATCH,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileActivationsResult {
    pub examined: usize,
    pub repaired: usize,
    pub failed: usize,
}

pub struct ReconcileActivationsHandler {
    payments: Arc<dyn PaymentRepository>,
    granter: Arc<SubscriptionGranter>,
}

impl ReconcileActivationsHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, granter: Arc<SubscriptionGranter>) -> Self {
        Self { payments, granter }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileActivationsCommand,
    ) -> Result<ReconcileActivationsResult, BillingError> {
        let unfinished = self
            .payments
            .find_awaiting_activation(cmd.batch_size)
            .await?;

        let mut result = ReconcileActivationsResult {
            examined: unfinished.len(),
            ..Default::default()
        };

        for payment in &unfinished {
            match self.granter.grant(payment).await {
                Ok(subscription) => {
                    result.repaired += 1;
                    tracing::info!(
                        payment_id = %payment.id,
                        subscription_id = %subscription.id,
                        user_id = %payment.user_id,
                        "Reconciled unfinished activation"
                    );
                }
                Err(e) if e.is_retryable() => {
                    result.failed += 1;
                    tracing::warn!(
                        payment_id = %payment.id,
                        error = %e,
                        "Reconciliation failed; retrying next pass"
                    );
                }
                Err(e) => {
                    result.failed += 1;
                    tracing::error!(
                        payment_id = %payment.id,
                        error = %e,
                        "Reconciliation failed; payment needs manual attention"
                    );
                }
            }
        }

        if result.examined > 0 {
            tracing::info!(
                examined = result.examined,
                repaired = result.repaired,
                failed = result.failed,
                "Reconciliation pass finished"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryBillingStore;
    use crate::application::handlers::billing::{ActivatePaymentCommand, ActivatePaymentHandler};
    use crate::domain::billing::{Payment, PlanCatalog, PlanTier};
    use crate::domain::foundation::{Timestamp, UserId};

    struct Fixture {
        store: InMemoryBillingStore,
        activation: ActivatePaymentHandler,
        reconcile: ReconcileActivationsHandler,
    }

    fn fixture() -> Fixture {
        let store = InMemoryBillingStore::new();
        let granter = Arc::new(SubscriptionGranter::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(PlanCatalog::standard()),
        ));
        Fixture {
            activation: ActivatePaymentHandler::new(Arc::new(store.clone()), Arc::clone(&granter)),
            reconcile: ReconcileActivationsHandler::new(Arc::new(store.clone()), granter),
            store,
        }
    }

    async fn pending(store: &InMemoryBillingStore, owner: &str, order: &str) {
        let user = UserId::new(owner).unwrap();
        store.add_member(user.clone());
        let offer = *PlanCatalog::standard().offer(PlanTier::Elite).unwrap();
        let payment = Payment::open(user, &offer, "INR", order, 30, Timestamp::now()).unwrap();
        PaymentRepository::insert(store, &payment).await.unwrap();
    }

    fn activate(owner: &str, order: &str) -> ActivatePaymentCommand {
        ActivatePaymentCommand {
            user_id: UserId::new(owner).unwrap(),
            gateway_order_id: order.to_string(),
            gateway_payment_id: format!("pay_{}", order),
        }
    }

    #[tokio::test]
    async fn nothing_to_do_on_consistent_store() {
        let f = fixture();
        pending(&f.store, "u1", "order_1").await;
        f.activation.handle(activate("u1", "order_1")).await.unwrap();

        let result = f.reconcile.handle(Default::default()).await.unwrap();

        assert_eq!(result, ReconcileActivationsResult::default());
    }

    #[tokio::test]
    async fn repairs_payment_left_without_subscription() {
        let f = fixture();
        pending(&f.store, "u1", "order_1").await;
        f.store.fail_subscription_inserts(true);
        assert!(f.activation.handle(activate("u1", "order_1")).await.is_err());
        f.store.fail_subscription_inserts(false);

        let result = f.reconcile.handle(Default::default()).await.unwrap();

        assert_eq!(result.repaired, 1);
        let subs = f.store.subscriptions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].payment_id, f.store.payments()[0].id);
        let member = f.store.member(&UserId::new("u1").unwrap()).unwrap();
        assert_eq!(member.plan, PlanTier::Elite);
    }

    #[tokio::test]
    async fn repairs_plan_left_unapplied_after_subscription_insert() {
        let f = fixture();
        pending(&f.store, "u1", "order_1").await;
        f.store.fail_plan_updates(true);
        assert!(f.activation.handle(activate("u1", "order_1")).await.is_err());
        f.store.fail_plan_updates(false);
        assert_eq!(f.store.subscriptions().len(), 1);

        let result = f.reconcile.handle(Default::default()).await.unwrap();

        assert_eq!(result.examined, 1);
        assert_eq!(result.repaired, 1);
        assert_eq!(f.store.subscriptions().len(), 1);
        let member = f.store.member(&UserId::new("u1").unwrap()).unwrap();
        assert_eq!(member.plan, PlanTier::Elite);
        assert_eq!(member.plan_expires_at, Some(f.store.payments()[0].plan_end_date));
        assert!(f.store.payments()[0].plan_applied_at.is_some());
    }

    #[tokio::test]
    async fn rerunning_is_harmless() {
        let f = fixture();
        pending(&f.store, "u1", "order_1").await;
        f.store.fail_subscription_inserts(true);
        let _ = f.activation.handle(activate("u1", "order_1")).await;
        f.store.fail_subscription_inserts(false);

        f.reconcile.handle(Default::default()).await.unwrap();
        let second = f.reconcile.handle(Default::default()).await.unwrap();

        assert_eq!(second.examined, 0);
        assert_eq!(f.store.subscriptions().len(), 1);
    }

    #[tokio::test]
    async fn pending_payments_are_left_alone() {
        let f = fixture();
        pending(&f.store, "u1", "order_1").await;

        let result = f.reconcile.handle(Default::default()).await.unwrap();

        assert_eq!(result.examined, 0);
        assert!(f.store.payments()[0].is_pending());
    }

    #[tokio::test]
    async fn failures_are_counted_and_retried_next_pass() {
        let f = fixture();
        pending(&f.store, "u1", "order_1").await;
        pending(&f.store, "u2", "order_2").await;
        f.store.fail_subscription_inserts(true);
        let _ = f.activation.handle(activate("u1", "order_1")).await;
        let _ = f.activation.handle(activate("u2", "order_2")).await;

        let first = f.reconcile.handle(Default::default()).await.unwrap();
        assert_eq!(first.failed, 2);

        f.store.fail_subscription_inserts(false);
        let second = f.reconcile.handle(Default::default()).await.unwrap();
        assert_eq!(second.repaired, 2);
    }

    #[tokio::test]
    async fn batch_size_bounds_one_pass() {
        let f = fixture();
        f.store.fail_subscription_inserts(true);
        for i in 0..3 {
            let order = format!("order_{}", i);
            pending(&f.store, "u1", &order).await;
            let _ = f.activation.handle(activate("u1", &order)).await;
        }
        f.store.fail_subscription_inserts(false);

        let result = f
            .reconcile
            .handle(ReconcileActivationsCommand { batch_size: 2 })
            .await
            .unwrap();

        assert_eq!(result.examined, 2);
        assert_eq!(f.store.subscriptions().len(), 2);
    }
}
