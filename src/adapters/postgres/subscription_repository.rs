//! PostgreSQL implementation of SubscriptionRepository.
//!
//! `subscriptions.payment_id` is unique, so inserting twice for the same
//! payment is a no-op that returns the stored row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{EntitlementBundle, PlanTier, Subscription, SubscriptionStatus};
use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp, UserId,
};
use crate::ports::{SaveResult, SubscriptionRepository};

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: String,
    plan_type: String,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    auto_renew: bool,
    payment_id: Uuid,
    features: Json<EntitlementBundle>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(corrupt_row)?,
            plan_type: row.plan_type.parse::<PlanTier>().map_err(corrupt_row)?,
            status: row.status.parse::<SubscriptionStatus>().map_err(corrupt_row)?,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            auto_renew: row.auto_renew,
            payment_id: PaymentId::from_uuid(row.payment_id),
            features: row.features.0,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn corrupt_row(e: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid subscription row: {}", e),
    )
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert_for_payment(
        &self,
        subscription: &Subscription,
    ) -> Result<SaveResult, DomainError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_type, status, start_date, end_date, auto_renew,
                payment_id, features, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (payment_id) DO NOTHING
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_str())
        .bind(subscription.plan_type.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.start_date.as_datetime())
        .bind(subscription.end_date.as_datetime())
        .bind(subscription.auto_renew)
        .bind(subscription.payment_id.as_uuid())
        .bind(Json(subscription.features))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert subscription: {}", e)))?
        .rows_affected()
            == 1;

        if inserted {
            return Ok(SaveResult::Inserted(subscription.clone()));
        }

        match self.find_by_payment_id(&subscription.payment_id).await? {
            Some(existing) => Ok(SaveResult::AlreadyExists(existing)),
            None => Err(DomainError::database(format!(
                "Subscription for payment {} conflicted but could not be read back",
                subscription.payment_id
            ))),
        }
    }

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_type, status, start_date, end_date, auto_renew,
                   payment_id, features, created_at, updated_at
            FROM subscriptions
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find subscription: {}", e)))?;

        row.map(Subscription::try_from).transpose()
    }
}
