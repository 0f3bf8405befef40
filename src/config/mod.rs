//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `FARM_LEDGER` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use farm_ledger::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;
use std::time::Duration;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Absent means the in-memory store is used
    pub database: Option<DatabaseConfig>,

    /// Gateway credentials and checkout settings
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FARM_LEDGER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `FARM_LEDGER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `FARM_LEDGER__PAYMENT__SECRET_KEY=sk_test_...` -> `payment.secret_key`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FARM_LEDGER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.payment.validate(self.is_production())?;
        // A verify call must get the gateway's answer before the request times out.
        if self.payment.timeout_secs >= self.server.request_timeout_secs {
            return Err(ValidationError::GatewayTimeoutNotBelowRequest);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

/// Accepts `1..=max` seconds.
fn timeout_within(secs: u64, max: u64, err: ValidationError) -> Result<Duration, ValidationError> {
    if secs == 0 || secs > max {
        return Err(err);
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("FARM_LEDGER__PAYMENT__SECRET_KEY", "sk_test_xxx");
    }

    fn clear_env() {
        for key in [
            "FARM_LEDGER__PAYMENT__SECRET_KEY",
            "FARM_LEDGER__PAYMENT__TIMEOUT_SECS",
            "FARM_LEDGER__DATABASE__URL",
            "FARM_LEDGER__SERVER__PORT",
            "FARM_LEDGER__SERVER__ENVIRONMENT",
            "FARM_LEDGER__SERVER__REQUEST_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_minimal_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.payment.secret_key.expose_secret(), "sk_test_xxx");
        assert_eq!(config.payment.base_url, "https://api.paystack.co");
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_database_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FARM_LEDGER__DATABASE__URL", "postgresql://test@localhost/farm");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.database.map(|d| d.url),
            Some("postgresql://test@localhost/farm".to_string())
        );
    }

    #[test]
    fn test_missing_secret_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn test_gateway_timeout_out_of_range_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FARM_LEDGER__PAYMENT__TIMEOUT_SECS", "500");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::InvalidGatewayTimeout));
    }

    #[test]
    fn test_gateway_timeout_must_fit_inside_request_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FARM_LEDGER__SERVER__REQUEST_TIMEOUT_SECS", "20");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::GatewayTimeoutNotBelowRequest));
    }

    #[test]
    fn test_timeout_within_bounds() {
        assert_eq!(
            timeout_within(5, 10, ValidationError::InvalidRequestTimeout),
            Ok(Duration::from_secs(5))
        );
        assert_eq!(
            timeout_within(0, 10, ValidationError::InvalidRequestTimeout),
            Err(ValidationError::InvalidRequestTimeout)
        );
        assert_eq!(
            timeout_within(11, 10, ValidationError::InvalidGatewayTimeout),
            Err(ValidationError::InvalidGatewayTimeout)
        );
    }

    #[test]
    fn test_server_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FARM_LEDGER__SERVER__PORT", "3000");
        env::set_var("FARM_LEDGER__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
    }
}
