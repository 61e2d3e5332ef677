//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the billing core to external systems:
//! - `auth` - Access-token validation (HS256 JWT, mock)
//! - `http` - axum routes, middleware and error mapping
//! - `memory` - In-memory repositories for tests
//! - `postgres` - sqlx repositories
//! - `razorpay` - Payment gateway client and mock

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod razorpay;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use memory::InMemoryBillingStore;
pub use postgres::{
    PostgresMemberPlanRepository, PostgresPaymentRepository, PostgresSubscriptionRepository,
};
pub use razorpay::{MockPaymentGateway, RazorpayConfig, RazorpayGateway};
