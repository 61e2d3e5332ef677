//! SubscriptionGranter - derives subscription and plan state from a completed payment.
//!
//! Shared by live activation and by reconciliation. Every step is
//! idempotent: the subscription insert is keyed on the payment, the plan
//! update is a plain overwrite with values taken from the payment, and the
//! final mark on the payment only ever sets its first timestamp.
//!
//! Until that mark lands the payment stays in the reconciliation backlog,
//! whichever step failed.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Payment, PlanCatalog, Subscription};
use crate::domain::foundation::Timestamp;
use crate::ports::{MemberPlanRepository, PaymentRepository, SubscriptionRepository};

pub struct SubscriptionGranter {
    payments: Arc<dyn PaymentRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    members: Arc<dyn MemberPlanRepository>,
    catalog: Arc<PlanCatalog>,
}

impl SubscriptionGranter {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        members: Arc<dyn MemberPlanRepository>,
        catalog: Arc<PlanCatalog>,
    ) -> Self {
        Self {
            payments,
            subscriptions,
            members,
            catalog,
        }
    }

    /// Creates (or finds) the subscription for `payment` and points the
    /// owner's plan at it.
    pub async fn grant(&self, payment: &Payment) -> Result<Subscription, BillingError> {
        let now = Timestamp::now();

        // 1. Entitlements for the purchased tier
        let features = self.catalog.entitlements_for(payment.plan_type);

        // 2. Subscription, at most one per payment
        let candidate = Subscription::activate_from(payment, features, now)?;
        let saved = self.subscriptions.insert_for_payment(&candidate).await?;
        if !saved.was_inserted() {
            tracing::debug!(payment_id = %payment.id, "Subscription already present for payment");
        }
        let subscription = saved.into_subscription();

        // 3. Owner's plan and expiry
        let updated = self
            .members
            .set_plan(
                &payment.user_id,
                payment.plan_type,
                payment.plan_end_date,
                now,
            )
            .await?;
        if !updated {
            tracing::warn!(
                user_id = %payment.user_id,
                payment_id = %payment.id,
                "No account row for user; plan not recorded"
            );
        }

        // 4. Activation done; drop out of the reconciliation backlog
        self.payments.mark_plan_applied(&payment.id, now).await?;

        Ok(subscription)
    }
}
