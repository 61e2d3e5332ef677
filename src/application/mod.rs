//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    ActivatePaymentCommand, ActivatePaymentHandler, ActivatePaymentResult, CreateOrderCommand,
    CreateOrderHandler, CreateOrderResult, ReconcileActivationsCommand,
    ReconcileActivationsHandler, ReconcileActivationsResult, SubscriptionGranter,
    VerifyPaymentCommand, VerifyPaymentHandler,
};
