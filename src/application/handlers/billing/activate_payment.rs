//! ActivatePaymentHandler - Command handler for completing a verified payment.

use std::sync::Arc;

use crate::domain::billing::{BillingError, NotFoundCause, Payment, Subscription};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::PaymentRepository;

use super::SubscriptionGranter;

/// Command to activate a payment whose signature has been checked.
#[derive(Debug, Clone)]
pub struct ActivatePaymentCommand {
    pub user_id: UserId,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
}

#[derive(Debug, Clone)]
pub struct ActivatePaymentResult {
    pub payment: Payment,
    pub subscription: Subscription,
}

/// Moves the caller's pending payment to completed and grants the plan.
///
/// The conditional update decides races: only the caller whose update
/// matched goes on to grant. A crash after that update leaves a completed
/// payment awaiting activation, which `ReconcileActivationsHandler` finishes.
pub struct ActivatePaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    granter: Arc<SubscriptionGranter>,
}

impl ActivatePaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, granter: Arc<SubscriptionGranter>) -> Self {
        Self { payments, granter }
    }

    pub async fn handle(
        &self,
        cmd: ActivatePaymentCommand,
    ) -> Result<ActivatePaymentResult, BillingError> {
        // 1. Claim the pending payment
        let claimed = self
            .payments
            .complete_pending(
                &cmd.user_id,
                &cmd.gateway_order_id,
                &cmd.gateway_payment_id,
                Timestamp::now(),
            )
            .await?;

        let payment = match claimed {
            Some(payment) => payment,
            None => {
                self.log_miss(&cmd).await;
                return Err(BillingError::payment_not_found());
            }
        };

        tracing::info!(
            user_id = %payment.user_id,
            payment_id = %payment.id,
            order_id = %payment.gateway_order_id,
            "Payment completed"
        );

        // 2. Subscription and plan
        let subscription = self.granter.grant(&payment).await.map_err(|e| {
            tracing::error!(
                payment_id = %payment.id,
                error = %e,
                "Payment completed but activation failed; left for reconciliation"
            );
            e
        })?;

        Ok(ActivatePaymentResult {
            payment,
            subscription,
        })
    }

    /// Records why nothing matched. The caller only ever sees "not found".
    async fn log_miss(&self, cmd: &ActivatePaymentCommand) {
        let cause = match self
            .payments
            .find_by_gateway_order_id(&cmd.gateway_order_id)
            .await
        {
            Ok(found) => NotFoundCause::classify(found.as_ref(), &cmd.user_id),
            Err(e) => {
                tracing::warn!(error = %e, "Could not classify missing payment");
                return;
            }
        };

        tracing::warn!(
            user_id = %cmd.user_id,
            order_id = %cmd.gateway_order_id,
            cause = %cause,
            "No pending payment for activation"
        );
    }
}
