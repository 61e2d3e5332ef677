//! Billing handlers.
//!
//! ## Commands
//! - Opening a gateway order for a plan purchase
//! - Verifying a checkout completion claim
//! - Activating a verified payment
//! - Reconciling payments completed without a subscription

mod activate_payment;
mod create_order;
mod grant_subscription;
mod reconcile_activations;
mod verify_payment;

pub use activate_payment::{ActivatePaymentCommand, ActivatePaymentHandler, ActivatePaymentResult};
pub use create_order::{
    CreateOrderCommand, CreateOrderHandler, CreateOrderResult, DEFAULT_GATEWAY_ATTEMPT_TIMEOUT,
};
pub use grant_subscription::SubscriptionGranter;
pub use reconcile_activations::{
    ReconcileActivationsCommand, ReconcileActivationsHandler, ReconcileActivationsResult,
    DEFAULT_RECONCILE_BATCH,
};
pub use verify_payment::{VerifyPaymentCommand, VerifyPaymentHandler};
