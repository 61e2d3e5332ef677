//! Payment aggregate: one row per purchase attempt.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{PlanOffer, PlanTier};
use crate::domain::foundation::{PaymentId, StateMachine, Timestamp, UserId, ValidationError};

/// Lifecycle of a payment attempt.
///
/// ```text
/// Pending ──► Completed ──► Refunded
///    │
///    └──────► Failed
/// ```
///
/// Only `Pending -> Completed` is driven by this service; the other edges
/// belong to back-office tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Completed) | (Pending, Failed) | (Completed, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Completed, Failed],
            Completed => vec![Refunded],
            Failed | Refunded => vec![],
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

/// Instrument the customer paid with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Upi,
    Netbanking,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Netbanking => "netbanking",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "netbanking" => Ok(PaymentMethod::Netbanking),
            other => Err(ValidationError::invalid_format(
                "payment_method",
                format!("unknown payment method '{}'", other),
            )),
        }
    }
}

/// Which processor handled the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayProvider {
    #[default]
    Razorpay,
    Stripe,
}

impl GatewayProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayProvider::Razorpay => "razorpay",
            GatewayProvider::Stripe => "stripe",
        }
    }
}

impl FromStr for GatewayProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "razorpay" => Ok(GatewayProvider::Razorpay),
            "stripe" => Ok(GatewayProvider::Stripe),
            other => Err(ValidationError::invalid_format(
                "payment_gateway",
                format!("unknown gateway '{}'", other),
            )),
        }
    }
}

/// A purchase attempt for one plan period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub plan_type: PlanTier,
    /// Major currency units.
    pub amount: i64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_gateway: GatewayProvider,
    pub transaction_id: String,
    pub gateway_order_id: String,
    /// Empty until the payment completes.
    pub gateway_payment_id: String,
    pub status: PaymentStatus,
    pub plan_start_date: Timestamp,
    pub plan_end_date: Timestamp,
    /// Set once the subscription exists and the owner's plan points at it.
    pub plan_applied_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    /// Opens a pending payment for a gateway order.
    ///
    /// The plan period starts now and lasts `period_days`.
    pub fn open(
        user_id: UserId,
        offer: &PlanOffer,
        currency: impl Into<String>,
        gateway_order_id: impl Into<String>,
        period_days: i64,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let gateway_order_id = gateway_order_id.into();
        if gateway_order_id.trim().is_empty() {
            return Err(ValidationError::empty_field("gateway_order_id"));
        }
        if period_days <= 0 {
            return Err(ValidationError::out_of_range("period_days", 1, 3650, period_days));
        }

        Ok(Self {
            id: PaymentId::new(),
            user_id,
            plan_type: offer.tier,
            amount: offer.price,
            currency: currency.into(),
            payment_method: PaymentMethod::default(),
            payment_gateway: GatewayProvider::default(),
            transaction_id: gateway_order_id.clone(),
            gateway_order_id,
            gateway_payment_id: String::new(),
            status: PaymentStatus::Pending,
            plan_start_date: now,
            plan_end_date: now.add_days(period_days),
            plan_applied_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Records a verified completion from the gateway.
    pub fn complete(
        &mut self,
        gateway_payment_id: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        let gateway_payment_id = gateway_payment_id.into();
        if gateway_payment_id.trim().is_empty() {
            return Err(ValidationError::empty_field("gateway_payment_id"));
        }
        self.status = self.status.transition_to(PaymentStatus::Completed)?;
        self.gateway_payment_id = gateway_payment_id;
        self.updated_at = now;
        Ok(())
    }

    /// Records that activation finished for this payment.
    pub fn mark_plan_applied(&mut self, now: Timestamp) -> Result<(), ValidationError> {
        if !self.is_completed() {
            return Err(ValidationError::invalid_format(
                "status",
                format!("cannot apply plan of a {} payment", self.status.as_str()),
            ));
        }
        if self.plan_applied_at.is_none() {
            self.plan_applied_at = Some(now);
            self.updated_at = now;
        }
        Ok(())
    }

    /// Completed, but the grant has not finished.
    pub fn awaits_activation(&self) -> bool {
        self.is_completed() && self.plan_applied_at.is_none()
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
