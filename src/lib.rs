//! PulseFit billing service
//!
//! Sells fixed-price fitness plans through the Razorpay checkout flow:
//! opens gateway orders, verifies signed completion claims, and grants the
//! purchased plan's entitlements to the member.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
