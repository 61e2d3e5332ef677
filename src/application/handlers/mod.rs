//! Application handlers.
//!
//! Command handlers that orchestrate domain operations across ports.

pub mod billing;

pub use billing::{
    ActivatePaymentCommand, ActivatePaymentHandler, ActivatePaymentResult, CreateOrderCommand,
    CreateOrderHandler, CreateOrderResult, ReconcileActivationsCommand,
    ReconcileActivationsHandler, ReconcileActivationsResult, SubscriptionGranter,
    VerifyPaymentCommand, VerifyPaymentHandler,
};
