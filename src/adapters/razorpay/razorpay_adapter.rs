//! Razorpay payment gateway adapter.
//!
//! Implements `PaymentGateway` against the Razorpay Orders API
//! (`POST /v1/orders`, HTTP basic auth with key id and key secret).
//!
//! # Configuration
//!
//! ```ignore
//! let config = RazorpayConfig::new("rzp_test_abc", "secret");
//! let gateway = RazorpayGateway::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{CreateOrderRequest, GatewayOrder, PaymentError, PaymentGateway};

/// Default API base URL.
pub const RAZORPAY_API_BASE: &str = "https://api.razorpay.com";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Publishable key id (`rzp_live_...` or `rzp_test_...`).
    key_id: String,

    /// Secret paired with the key id.
    key_secret: SecretString,

    api_base_url: String,

    timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: SecretString) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret,
            api_base_url: RAZORPAY_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Razorpay gateway adapter.
pub struct RazorpayGateway {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

/// Error envelope returned by the Razorpay API.
#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Maps a non-success response to a classified `PaymentError`.
fn error_from_response(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let detail = serde_json::from_str::<RazorpayErrorBody>(body).ok().map(|b| b.error);
    let description = detail
        .as_ref()
        .and_then(|d| d.description.clone())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let message = format!("Razorpay API error: {}", description);

    let error = match status.as_u16() {
        401 | 403 => PaymentError::authentication(message),
        429 => PaymentError::rate_limited(message),
        400..=499 => PaymentError::invalid_request(message),
        500..=599 => PaymentError::unavailable(message),
        _ => PaymentError::provider(message),
    };

    match detail.and_then(|d| d.code) {
        Some(code) => error.with_provider_code(code),
        None => error,
    }
}

fn error_from_transport(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::timeout(format!("Razorpay request timed out: {}", err))
    } else {
        PaymentError::network(format!("Razorpay request failed: {}", err))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, PaymentError> {
        let url = format!("{}/v1/orders", self.config.api_base_url);

        let body = serde_json::json!({
            "amount": request.amount,
            "currency": request.currency,
            "receipt": request.receipt,
            "notes": request.notes,
        });

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(error_from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = error_from_response(status, &error_text);
            tracing::error!(
                status = status.as_u16(),
                provider_code = ?error.provider_code,
                receipt = %request.receipt,
                "Razorpay create_order failed"
            );
            return Err(error);
        }

        let order: GatewayOrder = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Razorpay response: {}", e))
        })?;

        tracing::debug!(order_id = %order.id, amount = order.amount, "Razorpay order created");
        Ok(order)
    }

    fn public_key(&self) -> &str {
        &self.config.key_id
    }
}
