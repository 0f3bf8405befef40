//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::timeout_within;

const MAX_GATEWAY_TIMEOUT_SECS: u64 = 120;

/// Paystack-compatible gateway settings.
///
/// `secret_key` is both the API bearer key and the webhook HMAC key.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub secret_key: SecretString,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Outbound call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Where the gateway sends the payer after checkout
    pub callback_url: Option<String>,

    #[serde(default = "default_currency")]
    pub currency: String,
}

impl PaymentConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            callback_url: None,
            currency: default_currency(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_test_mode(&self) -> bool {
        self.secret_key.expose_secret().starts_with("sk_test_")
    }

    /// Validate payment configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        let key = self.secret_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__SECRET_KEY"));
        }
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidSecretKey);
        }
        timeout_within(
            self.timeout_secs,
            MAX_GATEWAY_TIMEOUT_SECS,
            ValidationError::InvalidGatewayTimeout,
        )?;
        if production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::GatewayMustBeHttps);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_currency() -> String {
    "NGN".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_paystack() {
        let config = PaymentConfig::new("sk_test_abc");
        assert_eq!(config.base_url, "https://api.paystack.co");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.currency, "NGN");
        assert!(config.is_test_mode());
    }

    #[test]
    fn validation_valid_config() {
        assert!(PaymentConfig::new("sk_live_abc").validate(true).is_ok());
    }

    #[test]
    fn validation_missing_key() {
        assert_eq!(
            PaymentConfig::new("").validate(false),
            Err(ValidationError::MissingRequired("PAYMENT__SECRET_KEY"))
        );
    }

    #[test]
    fn validation_wrong_key_prefix() {
        assert_eq!(
            PaymentConfig::new("pk_test_abc").validate(false),
            Err(ValidationError::InvalidSecretKey)
        );
    }

    #[test]
    fn validation_timeout_bounds() {
        let mut config = PaymentConfig::new("sk_test_abc");
        config.timeout_secs = 0;
        assert!(config.validate(false).is_err());
        config.timeout_secs = 121;
        assert!(config.validate(false).is_err());
        config.timeout_secs = 120;
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn validation_plain_http_only_outside_production() {
        let mut config = PaymentConfig::new("sk_test_abc");
        config.base_url = "http://localhost:9999".to_string();
        assert!(config.validate(false).is_ok());
        assert_eq!(config.validate(true), Err(ValidationError::GatewayMustBeHttps));
    }

    #[test]
    fn validation_currency_code() {
        let mut config = PaymentConfig::new("sk_test_abc");
        config.currency = "naira".to_string();
        assert_eq!(config.validate(false), Err(ValidationError::InvalidCurrency));
    }
}
