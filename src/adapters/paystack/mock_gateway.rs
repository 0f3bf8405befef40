//! Scripted payment gateway for tests and local runs.
//!
//! Supports:
//! - Per-reference verify statuses (default `Success`)
//! - Error injection for the next call
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::payment::{GatewayStatus, PaymentError, PaymentReference};
use crate::ports::{GatewayVerification, InitializePaymentRequest, PaymentGateway, PaymentSession};

/// Recorded call for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Initialize(InitializePaymentRequest),
    Verify(PaymentReference),
}

#[derive(Default)]
struct MockState {
    statuses: HashMap<PaymentReference, GatewayStatus>,
    default_status: Option<GatewayStatus>,
    next_error: Option<PaymentError>,
    calls: Vec<RecordedCall>,
}

/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.set_status(&reference, GatewayStatus::Failed);
/// gateway.fail_next(PaymentError::gateway_unavailable("timeout"));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════════

    /// Status reported by `verify` for one reference.
    pub fn set_status(&self, reference: &PaymentReference, status: GatewayStatus) {
        self.state().statuses.insert(reference.clone(), status);
    }

    /// Status reported for references without a scripted one.
    pub fn set_default_status(&self, status: GatewayStatus) {
        self.state().default_status = Some(status);
    }

    /// Error returned by the next call, whichever it is.
    pub fn fail_next(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn initialize_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::Initialize(_)))
            .count()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initialize(&self, request: InitializePaymentRequest) -> Result<PaymentSession, PaymentError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::Initialize(request.clone()));
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(PaymentSession {
            authorization_url: format!("https://checkout.example.test/{}", request.reference),
            access_code: Some(format!("access_{}", request.reference)),
            reference: request.reference.to_string(),
        })
    }

    async fn verify(&self, reference: &PaymentReference) -> Result<GatewayVerification, PaymentError> {
        let mut state = self.state();
        state.calls.push(RecordedCall::Verify(reference.clone()));
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        let status = state
            .statuses
            .get(reference)
            .copied()
            .or(state.default_status)
            .unwrap_or(GatewayStatus::Success);
        let raw_status = match status {
            GatewayStatus::Success => "success",
            GatewayStatus::Failed => "failed",
            GatewayStatus::Pending => "ongoing",
        };

        Ok(GatewayVerification {
            status,
            reference: reference.to_string(),
            amount_minor: None,
            raw: serde_json::json!({
                "status": true,
                "data": { "status": raw_status, "reference": reference.as_str() },
            }),
        })
    }
}
