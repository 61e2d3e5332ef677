//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth)
//! - `billing` - Plan catalog, payments, subscriptions and signature checks

pub mod billing;
pub mod foundation;
