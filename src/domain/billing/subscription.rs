//! Subscription aggregate: created once per activated payment.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{EntitlementBundle, Payment, PlanTier};
use crate::domain::foundation::{PaymentId, SubscriptionId, Timestamp, UserId, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
    Suspended,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "expired" => Ok(SubscriptionStatus::Expired),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "suspended" => Ok(SubscriptionStatus::Suspended),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

/// Entitlement grant backed by exactly one completed payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_type: PlanTier,
    pub status: SubscriptionStatus,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub auto_renew: bool,
    pub payment_id: PaymentId,
    pub features: EntitlementBundle,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Builds the active subscription for a completed payment.
    ///
    /// Tier and dates are copied from the payment.
    pub fn activate_from(
        payment: &Payment,
        features: EntitlementBundle,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        if !payment.is_completed() {
            return Err(ValidationError::invalid_format(
                "payment",
                format!("payment {} is {}, not completed", payment.id, payment.status.as_str()),
            ));
        }

        Ok(Self {
            id: SubscriptionId::new(),
            user_id: payment.user_id.clone(),
            plan_type: payment.plan_type,
            status: SubscriptionStatus::Active,
            start_date: payment.plan_start_date,
            end_date: payment.plan_end_date,
            auto_renew: false,
            payment_id: payment.id,
            features,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}
