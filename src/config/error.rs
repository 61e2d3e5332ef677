//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind host")]
    InvalidHost,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("JWT secret must be at least {0} bytes in production")]
    JwtSecretTooShort(usize),

    #[error("Invalid Razorpay key id format")]
    InvalidRazorpayKeyId,

    #[error("Live Razorpay keys are only allowed in production")]
    LiveKeyOutsideProduction,

    #[error("Payment API base URL must use HTTPS in production")]
    ApiBaseUrlMustBeHttps,

    #[error("Gateway request timeout must be between 1 and 60 seconds")]
    InvalidGatewayTimeout,

    #[error("Currency must be a three-letter ISO code")]
    InvalidCurrency,

    #[error("Invalid price for {0}")]
    InvalidPrice(&'static str),

    #[error("Plan period must be between 1 and 366 days")]
    InvalidPlanPeriod,

    #[error("Reconcile interval must be at least 10 seconds")]
    InvalidReconcileInterval,
}
