//! PostgreSQL adapters - database implementations of repository ports.

mod member_plan_repository;
mod payment_repository;
mod subscription_repository;

pub use member_plan_repository::PostgresMemberPlanRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
