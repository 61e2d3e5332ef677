//! Razorpay gateway adapters.
//!
//! - `razorpay_adapter` - Orders API client
//! - `mock_gateway` - In-process gateway for tests and local runs

mod mock_gateway;
mod razorpay_adapter;

pub use mock_gateway::{MockPaymentGateway, MOCK_KEY_ID};
pub use razorpay_adapter::{RazorpayConfig, RazorpayGateway, RAZORPAY_API_BASE};
