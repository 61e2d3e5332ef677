//! Billing module - plan purchases and the subscriptions they activate.
//!
//! # Flow
//!
//! ```text
//! create-order ──► Payment(pending) ──► verify ──► Payment(completed)
//!                                                    │
//!                                                    ├─► Subscription(active)
//!                                                    └─► User.plan / planExpiresAt
//! ```

mod catalog;
mod entitlements;
mod errors;
mod member_plan;
mod not_found;
mod payment;
mod signature;
mod subscription;
mod tier;

pub use catalog::{
    PlanCatalog, PlanOffer, DEFAULT_CURRENCY, DEFAULT_PLAN_PERIOD_DAYS, MAX_PLAN_PRICE,
    MINOR_UNITS_PER_MAJOR,
};
pub use entitlements::EntitlementBundle;
pub use errors::BillingError;
pub use member_plan::MemberPlan;
pub use not_found::NotFoundCause;
pub use payment::{GatewayProvider, Payment, PaymentMethod, PaymentStatus};
pub use signature::PaymentSignatureVerifier;
pub use subscription::{Subscription, SubscriptionStatus};
pub use tier::PlanTier;

#[cfg(test)]
pub use signature::sign_for_test;
