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

    #[error("Port must not be 0")]
    InvalidPort,

    #[error("Request timeout must be between 1 and 300 seconds")]
    InvalidRequestTimeout,

    #[error("CORS origin '{0}' must start with http:// or https://")]
    InvalidCorsOrigin(String),

    #[error("CORS origins must be listed in production")]
    CorsOriginsRequired,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Payment secret key must start with 'sk_'")]
    InvalidSecretKey,

    #[error("Gateway timeout must be between 1 and 120 seconds")]
    InvalidGatewayTimeout,

    #[error("Gateway timeout must be shorter than the request timeout")]
    GatewayTimeoutNotBelowRequest,

    #[error("Gateway base URL must use HTTPS in production")]
    GatewayMustBeHttps,

    #[error("Currency must be a three-letter ISO code")]
    InvalidCurrency,
}
