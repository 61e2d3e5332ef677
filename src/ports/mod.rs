//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the billing domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentGateway` - Order creation at the payment processor
//! - `PaymentRepository` - Purchase attempts and their conditional completion
//! - `SubscriptionRepository` - Activated subscriptions, one per payment
//! - `MemberPlanRepository` - Plan fields on user accounts
//! - `SessionValidator` - Bearer token validation

mod member_plan_repository;
mod payment_gateway;
mod payment_repository;
mod session_validator;
mod subscription_repository;

pub use member_plan_repository::MemberPlanRepository;
pub use payment_gateway::{
    CreateOrderRequest, GatewayOrder, OrderNotes, PaymentError, PaymentErrorCode, PaymentGateway,
};
pub use payment_repository::PaymentRepository;
pub use session_validator::SessionValidator;
pub use subscription_repository::{SaveResult, SubscriptionRepository};
