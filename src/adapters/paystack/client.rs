//! HTTP client for the Paystack API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::domain::payment::{GatewayStatus, PaymentError, PaymentReference};
use crate::ports::{GatewayVerification, InitializePaymentRequest, PaymentGateway, PaymentSession};

use super::wire::{Envelope, InitializeBody, InitializeData, VerifyData};

/// Gateway client settings.
#[derive(Clone)]
pub struct PaystackConfig {
    secret_key: SecretString,
    base_url: String,
    timeout: Duration,
}

impl PaystackConfig {
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            secret_key,
            base_url: "https://api.paystack.co".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&crate::config::PaymentConfig> for PaystackConfig {
    fn from(config: &crate::config::PaymentConfig) -> Self {
        PaystackConfig::new(config.secret_key.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout())
    }
}

/// Paystack implementation of [`PaymentGateway`].
///
/// Stateless: every call is a single outbound request with the configured
/// timeout. No retries; callers decide.
pub struct PaystackGateway {
    config: PaystackConfig,
    http_client: Client,
}

impl PaystackGateway {
    /// # Errors
    ///
    /// `Infrastructure` if the HTTP client cannot be built.
    pub fn new(config: PaystackConfig) -> Result<Self, PaymentError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::infrastructure(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { config, http_client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Sends a request and unwraps the Paystack envelope.
    ///
    /// Transport errors, timeouts, non-2xx statuses and `status: false`
    /// bodies all become `GatewayUnavailable`. Returns the data section and
    /// the full body.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<(T, serde_json::Value), PaymentError> {
        let response = request
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("{} timed out after {}s", operation, self.config.timeout.as_secs())
                } else {
                    format!("{} request failed: {}", operation, e)
                };
                tracing::error!(operation, error = %e, "Gateway request failed");
                PaymentError::gateway_unavailable(reason)
            })?;

        let http_status = response.status();
        let raw: serde_json::Value = response.json().await.map_err(|e| {
            tracing::error!(operation, status = %http_status, error = %e, "Unreadable gateway response");
            PaymentError::gateway_unavailable(format!("{} returned an unreadable body", operation))
        })?;

        if !http_status.is_success() {
            tracing::error!(operation, status = %http_status, body = %raw, "Gateway rejected request");
            return Err(PaymentError::gateway_unavailable(format!(
                "{} returned HTTP {}",
                operation, http_status
            )));
        }

        let envelope: Envelope<T> = serde_json::from_value(raw.clone()).map_err(|e| {
            PaymentError::gateway_unavailable(format!("{} response did not match: {}", operation, e))
        })?;
        match (envelope.status, envelope.data) {
            (true, Some(data)) => Ok((data, raw)),
            _ => {
                tracing::error!(operation, message = %envelope.message, "Gateway reported failure");
                Err(PaymentError::gateway_unavailable(format!(
                    "{} rejected: {}",
                    operation, envelope.message
                )))
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize(&self, request: InitializePaymentRequest) -> Result<PaymentSession, PaymentError> {
        let body = InitializeBody {
            email: &request.email,
            amount: request.amount_minor.to_string(),
            reference: request.reference.as_str(),
            currency: &request.currency,
            callback_url: request.callback_url.as_deref(),
            metadata: request.metadata.as_ref(),
        };

        let (data, _): (InitializeData, _) = self
            .send(
                "initialize",
                self.http_client.post(self.url("/transaction/initialize")).json(&body),
            )
            .await?;

        if data.reference != request.reference.as_str() {
            tracing::warn!(
                sent = %request.reference,
                echoed = %data.reference,
                "Gateway echoed a different reference; keeping ours"
            );
        }
        tracing::info!(reference = %request.reference, amount = request.amount_minor, "Payment session opened");

        Ok(PaymentSession {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: request.reference.to_string(),
        })
    }

    async fn verify(&self, reference: &PaymentReference) -> Result<GatewayVerification, PaymentError> {
        let path = format!("/transaction/verify/{}", reference.as_str());
        let (data, raw): (VerifyData, _) = self.send("verify", self.http_client.get(self.url(&path))).await?;

        let status = GatewayStatus::from_gateway(&data.status);
        tracing::debug!(reference = %reference, gateway_status = %data.status, mapped = %status, "Payment verified");

        Ok(GatewayVerification {
            status,
            reference: data.reference,
            amount_minor: data.amount,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = PaystackConfig::new(SecretString::new("sk_test_x".to_string()))
            .with_base_url("http://localhost:9000/");
        let gateway = PaystackGateway::new(config).unwrap();

        assert_eq!(
            gateway.url("/transaction/initialize"),
            "http://localhost:9000/transaction/initialize"
        );
    }

    #[test]
    fn config_from_settings_keeps_timeout() {
        let mut settings = crate::config::PaymentConfig::new("sk_test_x");
        settings.timeout_secs = 7;
        let config = PaystackConfig::from(&settings);

        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.base_url, "https://api.paystack.co");
    }

    #[tokio::test]
    async fn unreachable_gateway_is_unavailable() {
        let config = PaystackConfig::new(SecretString::new("sk_test_x".to_string()))
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(1));
        let gateway = PaystackGateway::new(config).unwrap();
        let reference = PaymentReference::generate(crate::domain::payment::ReferenceKind::Order);

        let err = gateway.verify(&reference).await.unwrap_err();
        assert!(matches!(err, PaymentError::GatewayUnavailable(_)));
        assert!(err.is_retryable());
    }
}
