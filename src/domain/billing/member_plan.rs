//! The plan fields of a user account.
//!
//! Profile data lives elsewhere; billing only writes these.

use serde::{Deserialize, Serialize};

use super::PlanTier;
use crate::domain::foundation::{Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPlan {
    pub user_id: UserId,
    pub plan: PlanTier,
    pub plan_expires_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl MemberPlan {
    /// A fresh account on the free plan.
    pub fn free(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            plan: PlanTier::Free,
            plan_expires_at: None,
            updated_at: now,
        }
    }
}
