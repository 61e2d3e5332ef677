//! PostgreSQL implementation of MemberPlanRepository.
//!
//! Touches only the plan columns of `users`; the rest of the row belongs
//! to the account service.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::PlanTier;
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::MemberPlanRepository;

pub struct PostgresMemberPlanRepository {
    pool: PgPool,
}

impl PostgresMemberPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberPlanRepository for PostgresMemberPlanRepository {
    async fn set_plan(
        &self,
        user_id: &UserId,
        plan: PlanTier,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                plan = $2,
                plan_expires_at = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(plan.as_str())
        .bind(expires_at.as_datetime())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update user plan: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
