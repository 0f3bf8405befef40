//! HTTP listener settings.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use super::error::ValidationError;
use super::timeout_within;

/// Longest a single API request may run before the timeout layer answers 408.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub environment: Environment,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub request_timeout_secs: u64,
    /// Comma-separated browser origins. Unset allows any origin outside
    /// production.
    pub cors_origins: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Configured origins, blanks dropped.
    pub fn allowed_origins(&self) -> Vec<&str> {
        self.cors_origins
            .as_deref()
            .map(|raw| raw.split(',').map(str::trim).filter(|o| !o.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        timeout_within(
            self.request_timeout_secs,
            MAX_REQUEST_TIMEOUT_SECS,
            ValidationError::InvalidRequestTimeout,
        )?;

        let origins = self.allowed_origins();
        if let Some(bad) = origins
            .iter()
            .find(|o| !(o.starts_with("https://") || o.starts_with("http://")))
        {
            return Err(ValidationError::InvalidCorsOrigin((*bad).to_string()));
        }
        if origins.is_empty() && self.is_production() {
            return Err(ValidationError::CorsOriginsRequired);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            environment: Environment::Development,
            log_filter: "info,farm_ledger=debug,sqlx=warn".to_string(),
            request_timeout_secs: 60,
            cors_origins: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listens_on_all_interfaces_by_default() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn origins_skip_blanks() {
        let config = ServerConfig {
            cors_origins: Some("https://farm.example, ,http://localhost:5173,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.allowed_origins(),
            vec!["https://farm.example", "http://localhost:5173"]
        );
    }

    #[test]
    fn origin_without_scheme_is_rejected() {
        let config = ServerConfig {
            cors_origins: Some("https://farm.example,farm.example".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidCorsOrigin("farm.example".to_string()))
        );
    }

    #[test]
    fn production_needs_explicit_origins() {
        let mut config = ServerConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::CorsOriginsRequired));

        config.cors_origins = Some("https://farm.example".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn request_timeout_is_bounded() {
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidRequestTimeout));
        }
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }
}
