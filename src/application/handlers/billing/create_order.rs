//! CreateOrderHandler - Command handler for opening a plan purchase.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::billing::{BillingError, Payment, PlanCatalog, PlanTier};
use crate::domain::foundation::{AuthenticatedUser, Timestamp};
use crate::ports::{
    CreateOrderRequest, GatewayOrder, OrderNotes, PaymentError, PaymentGateway, PaymentRepository,
};

/// Default per-attempt deadline for the gateway call.
pub const DEFAULT_GATEWAY_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Command to open a purchase for a plan.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub user: AuthenticatedUser,
    pub plan: PlanTier,
}

impl CreateOrderCommand {
    /// Validates the raw plan name sent by the client.
    pub fn new(user: AuthenticatedUser, plan_type: &str) -> Result<Self, BillingError> {
        let plan: PlanTier = plan_type
            .parse()
            .map_err(|_| BillingError::invalid_plan(plan_type))?;
        if !plan.is_paid() {
            return Err(BillingError::invalid_plan(plan_type));
        }
        Ok(Self { user, plan })
    }
}

/// What the checkout widget needs to collect payment.
#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub order_id: String,
    /// Minor units, as reported by the gateway.
    pub amount: i64,
    pub currency: String,
    /// Publishable gateway key.
    pub key: String,
    pub payment: Payment,
}

/// Handler for opening a gateway order and recording the pending payment.
pub struct CreateOrderHandler {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
    catalog: Arc<PlanCatalog>,
    attempt_timeout: Duration,
}

impl CreateOrderHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentRepository>,
        catalog: Arc<PlanCatalog>,
    ) -> Self {
        Self {
            gateway,
            payments,
            catalog,
            attempt_timeout: DEFAULT_GATEWAY_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<CreateOrderResult, BillingError> {
        // 1. Price the plan
        let offer = *self
            .catalog
            .offer(cmd.plan)
            .ok_or_else(|| BillingError::invalid_plan(cmd.plan.as_str()))?;

        // 2. Open the gateway order, reusing the receipt on retry
        let now = Timestamp::now();
        let request = CreateOrderRequest {
            amount: offer.gateway_amount()?,
            currency: self.catalog.currency().to_string(),
            receipt: new_receipt(now),
            notes: OrderNotes {
                user_id: cmd.user.id.to_string(),
                plan_type: cmd.plan.to_string(),
            },
        };
        let order = self.open_order(request).await?;

        // 3. Record the pending payment
        let payment = Payment::open(
            cmd.user.id.clone(),
            &offer,
            self.catalog.currency(),
            order.id.clone(),
            self.catalog.period_days(),
            now,
        )?;
        self.payments.insert(&payment).await?;

        tracing::info!(
            user_id = %payment.user_id,
            payment_id = %payment.id,
            order_id = %order.id,
            plan = %payment.plan_type,
            amount = payment.amount,
            "Payment order created"
        );

        Ok(CreateOrderResult {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key: self.gateway.public_key().to_string(),
            payment,
        })
    }

    /// One attempt, plus a single retry when the failure is transient.
    async fn open_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, BillingError> {
        let first = match self.attempt(request.clone()).await {
            Ok(order) => return Ok(order),
            Err(e) => e,
        };

        if !first.retryable {
            tracing::error!(error = %first, receipt = %request.receipt, "Gateway rejected order");
            return Err(BillingError::gateway(first.to_string(), false));
        }

        tracing::warn!(error = %first, receipt = %request.receipt, "Gateway order failed, retrying once");
        let receipt = request.receipt.clone();
        self.attempt(request).await.map_err(|e| {
            tracing::error!(error = %e, receipt = %receipt, "Gateway order failed after retry");
            BillingError::gateway(e.to_string(), e.retryable)
        })
    }

    async fn attempt(&self, request: CreateOrderRequest) -> Result<GatewayOrder, PaymentError> {
        match tokio::time::timeout(self.attempt_timeout, self.gateway.create_order(request)).await {
            Ok(result) => result,
            Err(_) => Err(PaymentError::timeout(format!(
                "no response within {}ms",
                self.attempt_timeout.as_millis()
            ))),
        }
    }
}

/// Merchant receipt: creation time plus a random suffix.
fn new_receipt(now: Timestamp) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("receipt_{}_{}", now.as_unix_millis(), &suffix[..8])
}
