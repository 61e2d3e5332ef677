//! HTTP adapter for payment endpoints.
//!
//! - `POST /api/payments/create-order` - Open an order for a paid plan
//! - `POST /api/payments/verify` - Verify checkout completion and activate the plan

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{BillingApiError, PaymentsAppState};
pub use routes::payments_routes;
