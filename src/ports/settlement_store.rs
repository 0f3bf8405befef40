//! Settlement store port - the atomic unit of the reconciliation engine.
//!
//! # Design
//!
//! Each call is one database transaction:
//!
//! 1. Lock the payment transaction row by reference
//! 2. Ask [`admit`](crate::domain::payment::admit) whether to proceed
//! 3. Lock and load every other row the payment touches
//! 4. Run the pure domain settlement function on the loaded rows
//! 5. Persist all mutated rows and the ledger entry, then commit
//!
//! Any error rolls the whole unit back. A ledger reference uniqueness
//! violation at step 5 means another caller won the race; implementations
//! roll back and report `AlreadyProcessed`.

use async_trait::async_trait;

use crate::domain::billing::SubscriptionSettlement;
use crate::domain::foundation::Timestamp;
use crate::domain::marketplace::OrderSettlement;
use crate::domain::payment::{GatewayStatus, PaymentError, PaymentReference, SettlementOutcome};

/// Everything the store needs to settle one reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRequest {
    pub reference: PaymentReference,
    pub status: GatewayStatus,
    /// Gateway customer identity reported with the payment, if any.
    pub customer: Option<String>,
    /// Raw gateway evidence stored on the transaction row.
    pub gateway_response: Option<serde_json::Value>,
    pub at: Timestamp,
}

impl SettlementRequest {
    pub fn new(reference: PaymentReference, status: GatewayStatus) -> Self {
        Self {
            reference,
            status,
            customer: None,
            gateway_response: None,
            at: Timestamp::now(),
        }
    }

    pub fn with_customer(mut self, customer: Option<String>) -> Self {
        self.customer = customer;
        self
    }

    pub fn with_gateway_response(mut self, response: serde_json::Value) -> Self {
        self.gateway_response = Some(response);
        self
    }
}

#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Settles an order payment.
    ///
    /// # Errors
    ///
    /// - `ReferenceNotFound` if no order transaction carries the reference
    /// - `InvalidStateTransition` if the order can no longer become `PAID`
    /// - `Infrastructure` on storage failure
    async fn settle_order_payment(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome<OrderSettlement>, PaymentError>;

    /// Settles a subscription payment.
    ///
    /// # Errors
    ///
    /// - `ReferenceNotFound` if no billing transaction carries the reference
    /// - `Infrastructure` on storage failure
    async fn settle_subscription_payment(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome<SubscriptionSettlement>, PaymentError>;
}
