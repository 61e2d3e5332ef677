//! Port for the plan fields of user accounts.

use async_trait::async_trait;

use crate::domain::billing::PlanTier;
use crate::domain::foundation::{DomainError, Timestamp, UserId};

/// Writes `plan` / `planExpiresAt` on user accounts.
///
/// Accounts are created by signup, which this service does not own.
#[async_trait]
pub trait MemberPlanRepository: Send + Sync {
    /// Set the plan and expiry. Idempotent.
    ///
    /// Returns false if no account exists for `user_id`.
    async fn set_plan(
        &self,
        user_id: &UserId,
        plan: PlanTier,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_plan_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn MemberPlanRepository) {}
    }
}
