//! Why an activation found no pending payment.
//!
//! Callers always get the same "Payment not found" answer so they cannot
//! discover other users' orders. The cause is kept for logs.

use super::{Payment, PaymentStatus};
use crate::domain::foundation::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundCause {
    /// No payment carries this gateway order id.
    NeverExisted,
    /// The caller's payment was already completed, usually a replayed verify.
    AlreadyCompleted,
    /// The order belongs to a different user.
    OtherOwner,
    /// The caller's payment is in a state activation cannot leave.
    NotPending(PaymentStatus),
}

impl NotFoundCause {
    /// Classifies the miss from whatever payment holds the order id.
    pub fn classify(found: Option<&Payment>, caller: &UserId) -> Self {
        match found {
            None => NotFoundCause::NeverExisted,
            Some(payment) if !payment.is_owned_by(caller) => NotFoundCause::OtherOwner,
            Some(payment) => match payment.status {
                PaymentStatus::Completed => NotFoundCause::AlreadyCompleted,
                status => NotFoundCause::NotPending(status),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotFoundCause::NeverExisted => "never_existed",
            NotFoundCause::AlreadyCompleted => "already_completed",
            NotFoundCause::OtherOwner => "other_owner",
            NotFoundCause::NotPending(_) => "not_pending",
        }
    }
}

impl std::fmt::Display for NotFoundCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundCause::NotPending(status) => write!(f, "not_pending({})", status.as_str()),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
