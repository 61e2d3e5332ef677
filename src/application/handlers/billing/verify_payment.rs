//! VerifyPaymentHandler - Command handler for checkout completion claims.

use std::sync::Arc;

use crate::domain::billing::{BillingError, PaymentSignatureVerifier};
use crate::domain::foundation::AuthenticatedUser;

use super::{ActivatePaymentCommand, ActivatePaymentHandler, ActivatePaymentResult};

/// Completion claim posted by the client after checkout.
#[derive(Debug, Clone)]
pub struct VerifyPaymentCommand {
    pub user: AuthenticatedUser,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
}

impl VerifyPaymentCommand {
    /// Rejects blank fields before any lookup happens.
    pub fn new(
        user: AuthenticatedUser,
        gateway_order_id: impl Into<String>,
        gateway_payment_id: impl Into<String>,
        gateway_signature: impl Into<String>,
    ) -> Result<Self, BillingError> {
        let cmd = Self {
            user,
            gateway_order_id: gateway_order_id.into(),
            gateway_payment_id: gateway_payment_id.into(),
            gateway_signature: gateway_signature.into(),
        };

        for (field, value) in [
            ("gatewayOrderId", &cmd.gateway_order_id),
            ("gatewayPaymentId", &cmd.gateway_payment_id),
            ("gatewaySignature", &cmd.gateway_signature),
        ] {
            if value.trim().is_empty() {
                return Err(BillingError::validation(field, "must not be empty"));
            }
        }

        Ok(cmd)
    }
}

/// Checks the gateway signature, then activates the payment.
///
/// A bad signature leaves the payment untouched in `pending`.
pub struct VerifyPaymentHandler {
    verifier: PaymentSignatureVerifier,
    activation: Arc<ActivatePaymentHandler>,
}

impl VerifyPaymentHandler {
    pub fn new(verifier: PaymentSignatureVerifier, activation: Arc<ActivatePaymentHandler>) -> Self {
        Self {
            verifier,
            activation,
        }
    }

    pub async fn handle(
        &self,
        cmd: VerifyPaymentCommand,
    ) -> Result<ActivatePaymentResult, BillingError> {
        // 1. Authenticity
        if !self.verifier.verify(
            &cmd.gateway_order_id,
            &cmd.gateway_payment_id,
            &cmd.gateway_signature,
        ) {
            tracing::warn!(
                user_id = %cmd.user.id,
                order_id = %cmd.gateway_order_id,
                "Rejected payment completion with bad signature"
            );
            return Err(BillingError::invalid_signature());
        }

        // 2. Activation
        self.activation
            .handle(ActivatePaymentCommand {
                user_id: cmd.user.id,
                gateway_order_id: cmd.gateway_order_id,
                gateway_payment_id: cmd.gateway_payment_id,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryBillingStore;
    use crate::application::handlers::billing::SubscriptionGranter;
    use crate::domain::billing::{sign_for_test, Payment, PlanCatalog, PlanTier};
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::ports::PaymentRepository;
    use secrecy::SecretString;

    const SECRET: &str = "verify_secret";

    fn caller() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("u1").unwrap(), "u1@example.com")
    }

    async fn store_with_pending(order: &str) -> InMemoryBillingStore {
        let store = InMemoryBillingStore::new();
        store.add_member(caller().id);
        let offer = *PlanCatalog::standard().offer(PlanTier::Premium).unwrap();
        let payment = Payment::open(caller().id, &offer, "INR", order, 30, Timestamp::now()).unwrap();
        store.insert(&payment).await.unwrap();
        store
    }

    fn handler(store: &InMemoryBillingStore) -> VerifyPaymentHandler {
        let catalog = Arc::new(PlanCatalog::standard());
        let granter = SubscriptionGranter::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            catalog,
        );
        let activation = ActivatePaymentHandler::new(Arc::new(store.clone()), Arc::new(granter));
        VerifyPaymentHandler::new(
            PaymentSignatureVerifier::new(SecretString::new(SECRET.to_string())),
            Arc::new(activation),
        )
    }

    #[test]
    fn command_rejects_blank_fields() {
        let err = VerifyPaymentCommand::new(caller(), "order_1", "", "sig").unwrap_err();
        assert_eq!(err, BillingError::validation("gatewayPaymentId", "must not be empty"));

        assert!(VerifyPaymentCommand::new(caller(), " ", "pay", "sig").is_err());
        assert!(VerifyPaymentCommand::new(caller(), "order", "pay", "").is_err());
    }

    #[tokio::test]
    async fn valid_signature_activates_payment() {
        let store = store_with_pending("order_1").await;
        let sig = sign_for_test(SECRET, "order_1", "pay_1");

        let result = handler(&store)
            .handle(VerifyPaymentCommand::new(caller(), "order_1", "pay_1", sig).unwrap())
            .await
            .unwrap();

        assert_eq!(result.subscription.plan_type, PlanTier::Premium);
        assert_eq!(
            result.subscription.end_date,
            result.subscription.start_date.add_days(30)
        );
        assert_eq!(store.member(&caller().id).unwrap().plan, PlanTier::Premium);
    }

    #[tokio::test]
    async fn tampered_signature_leaves_payment_pending() {
        let store = store_with_pending("order_1").await;
        let sig = sign_for_test(SECRET, "order_1", "pay_other");

        let err = handler(&store)
            .handle(VerifyPaymentCommand::new(caller(), "order_1", "pay_1", sig).unwrap())
            .await
            .unwrap_err();

        assert_eq!(err, BillingError::InvalidSignature);
        assert!(store.payments()[0].is_pending());
        assert!(store.subscriptions().is_empty());
        assert_eq!(store.member(&caller().id).unwrap().plan, PlanTier::Free);
    }

    #[tokio::test]
    async fn replayed_claim_is_not_found() {
        let store = store_with_pending("order_1").await;
        let sig = sign_for_test(SECRET, "order_1", "pay_1");
        let handler = handler(&store);
        let cmd = VerifyPaymentCommand::new(caller(), "order_1", "pay_1", sig).unwrap();

        handler.handle(cmd.clone()).await.unwrap();
        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err, BillingError::PaymentNotFound);
        assert_eq!(store.subscriptions().len(), 1);
    }

    #[tokio::test]
    async fn signed_claim_for_unknown_order_is_not_found() {
        let store = InMemoryBillingStore::new();
        let sig = sign_for_test(SECRET, "order_ghost", "pay_1");

        let err = handler(&store)
            .handle(VerifyPaymentCommand::new(caller(), "order_ghost", "pay_1", sig).unwrap())
            .await
            .unwrap_err();

        assert_eq!(err, BillingError::PaymentNotFound);
    }
}
