//! Payment configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::billing::{PlanCatalog, PlanTier, DEFAULT_CURRENCY, DEFAULT_PLAN_PERIOD_DAYS};

/// Payment configuration (Razorpay and plan catalog)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Razorpay key id, also handed to the checkout widget
    #[serde(default)]
    pub key_id: String,

    /// Razorpay key secret; signs order auth and checkout signatures
    pub key_secret: SecretString,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Per-request timeout for gateway calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Price overrides in major currency units
    pub basic_price: Option<i64>,
    pub premium_price: Option<i64>,
    pub elite_price: Option<i64>,

    #[serde(default = "default_plan_period_days")]
    pub plan_period_days: i64,

    /// How often unfinished activations are retried, in seconds
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,

    #[serde(default = "default_reconcile_batch_size")]
    pub reconcile_batch_size: u32,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.key_id.starts_with("rzp_live_")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }

    /// Builds the plan catalog with any configured overrides applied.
    pub fn catalog(&self) -> Result<PlanCatalog, ValidationError> {
        let mut catalog = PlanCatalog::standard()
            .with_currency(self.currency.clone())
            .with_period_days(self.plan_period_days);

        for (tier, price) in [
            (PlanTier::Basic, self.basic_price),
            (PlanTier::Premium, self.premium_price),
            (PlanTier::Elite, self.elite_price),
        ] {
            if let Some(price) = price {
                catalog = catalog
                    .with_price(tier, price)
                    .map_err(|_| ValidationError::InvalidPrice(tier.as_str()))?;
            }
        }

        Ok(catalog)
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.key_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__KEY_ID"));
        }
        if self.key_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__KEY_SECRET"));
        }
        if !self.is_test_mode() && !self.is_live_mode() {
            return Err(ValidationError::InvalidRazorpayKeyId);
        }
        if *environment == Environment::Development && self.is_live_mode() {
            return Err(ValidationError::LiveKeyOutsideProduction);
        }
        if *environment == Environment::Production && !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::ApiBaseUrlMustBeHttps);
        }
        if !(1..=60).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidGatewayTimeout);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if !(1..=366).contains(&self.plan_period_days) {
            return Err(ValidationError::InvalidPlanPeriod);
        }
        if self.reconcile_interval_secs < 10 {
            return Err(ValidationError::InvalidReconcileInterval);
        }
        self.catalog()?;
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            key_secret: SecretString::new(String::new()),
            api_base_url: default_api_base_url(),
            currency: default_currency(),
            request_timeout_secs: default_request_timeout(),
            basic_price: None,
            premium_price: None,
            elite_price: None,
            plan_period_days: default_plan_period_days(),
            reconcile_interval_secs: default_reconcile_interval(),
            reconcile_batch_size: default_reconcile_batch_size(),
        }
    }
}

fn default_api_base_url() -> String {
    crate::adapters::razorpay::RAZORPAY_API_BASE.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_plan_period_days() -> i64 {
    DEFAULT_PLAN_PERIOD_DAYS
}

fn default_reconcile_interval() -> u64 {
    300
}

fn default_reconcile_batch_size() -> u32 {
    100
}
