//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{GatewayProvider, Payment, PaymentMethod, PaymentStatus, PlanTier};
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp, UserId};
use crate::ports::PaymentRepository;

const PAYMENT_COLUMNS: &str = r#"
    id, user_id, plan_type, amount, currency, payment_method, payment_gateway,
    transaction_id, gateway_order_id, gateway_payment_id, status,
    plan_start_date, plan_end_date, plan_applied_at, created_at, updated_at
"#;

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: String,
    plan_type: String,
    amount: i64,
    currency: String,
    payment_method: String,
    payment_gateway: String,
    transaction_id: String,
    gateway_order_id: String,
    gateway_payment_id: String,
    status: String,
    plan_start_date: DateTime<Utc>,
    plan_end_date: DateTime<Utc>,
    plan_applied_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(corrupt_row)?,
            plan_type: row.plan_type.parse::<PlanTier>().map_err(corrupt_row)?,
            amount: row.amount,
            currency: row.currency,
            payment_method: row.payment_method.parse::<PaymentMethod>().map_err(corrupt_row)?,
            payment_gateway: row
                .payment_gateway
                .parse::<GatewayProvider>()
                .map_err(corrupt_row)?,
            transaction_id: row.transaction_id,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            status: row.status.parse::<PaymentStatus>().map_err(corrupt_row)?,
            plan_start_date: Timestamp::from_datetime(row.plan_start_date),
            plan_end_date: Timestamp::from_datetime(row.plan_end_date),
            plan_applied_at: row.plan_applied_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn corrupt_row(e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Invalid payment row: {}", e))
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, plan_type, amount, currency, payment_method, payment_gateway,
                transaction_id, gateway_order_id, gateway_payment_id, status,
                plan_start_date, plan_end_date, plan_applied_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_str())
        .bind(payment.plan_type.as_str())
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.payment_method.as_str())
        .bind(payment.payment_gateway.as_str())
        .bind(&payment.transaction_id)
        .bind(&payment.gateway_order_id)
        .bind(&payment.gateway_payment_id)
        .bind(payment.status.as_str())
        .bind(payment.plan_start_date.as_datetime())
        .bind(payment.plan_end_date.as_datetime())
        .bind(payment.plan_applied_at.map(|t| *t.as_datetime()))
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if matches!(
                    db_err.constraint(),
                    Some("payments_gateway_order_id_key") | Some("payments_transaction_id_key")
                ) {
                    return DomainError::new(
                        ErrorCode::DuplicateOrder,
                        format!("Order {} already recorded", payment.gateway_order_id),
                    );
                }
            }
            db_error("Failed to insert payment", e)
        })?;

        Ok(())
    }

    async fn complete_pending(
        &self,
        user_id: &UserId,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        now: Timestamp,
    ) -> Result<Option<Payment>, DomainError> {
        // Single statement: the row lock plus the status predicate let only
        // one concurrent caller match.
        let query = format!(
            r#"
            UPDATE payments SET
                status = 'completed',
                gateway_payment_id = $3,
                updated_at = $4
            WHERE user_id = $1 AND gateway_order_id = $2 AND status = 'pending'
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );

        let row: Option<PaymentRow> = sqlx::query_as(&query)
            .bind(user_id.as_str())
            .bind(gateway_order_id)
            .bind(gateway_payment_id)
            .bind(now.as_datetime())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to complete payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let query = format!(
            "SELECT {} FROM payments WHERE gateway_order_id = $1",
            PAYMENT_COLUMNS
        );

        let row: Option<PaymentRow> = sqlx::query_as(&query)
            .bind(gateway_order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn mark_plan_applied(&self, id: &PaymentId, now: Timestamp) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE payments SET plan_applied_at = $2, updated_at = $2
            WHERE id = $1 AND status = 'completed' AND plan_applied_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark plan applied", e))?;

        Ok(())
    }

    async fn find_awaiting_activation(&self, limit: u32) -> Result<Vec<Payment>, DomainError> {
        let query = format!(
            r#"
            SELECT {} FROM payments
            WHERE status = 'completed' AND plan_applied_at IS NULL
            ORDER BY updated_at ASC
            LIMIT $1
            "#,
            PAYMENT_COLUMNS
        );

        let rows: Vec<PaymentRow> = sqlx::query_as(&query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list payments awaiting activation", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}
