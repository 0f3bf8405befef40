//! VerifyOrderPaymentHandler - Polls the gateway and settles an order payment.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::marketplace::OrderSettlement;
use crate::domain::payment::{
    OutcomeKind, PaymentError, PaymentReference, ReferenceKind, SettlementOutcome, TransactionStatus,
};
use crate::ports::{OrderRepository, OrderTransactionRepository, PaymentGateway, SettlementRequest};

use super::SettleOrderPaymentHandler;

#[derive(Debug, Clone)]
pub struct VerifyOrderPaymentCommand {
    pub user_id: UserId,
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct VerifyOrderPaymentResult {
    pub reference: PaymentReference,
    /// `Settled` or `AlreadyProcessed`; anything else is an error.
    pub outcome: OutcomeKind,
    pub settlement: Option<OrderSettlement>,
}

/// Explicit verification, used when the payer returns from checkout before
/// (or instead of) the webhook arriving.
///
/// # Errors
///
/// - `VerificationFailed` if the gateway reports failure or no final status
/// - `GatewayUnavailable` on outage; the transaction stays retryable
pub struct VerifyOrderPaymentHandler {
    orders: Arc<dyn OrderRepository>,
    transactions: Arc<dyn OrderTransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settle: Arc<SettleOrderPaymentHandler>,
}

impl VerifyOrderPaymentHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        transactions: Arc<dyn OrderTransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settle: Arc<SettleOrderPaymentHandler>,
    ) -> Self {
        Self {
            orders,
            transactions,
            gateway,
            settle,
        }
    }

    pub async fn handle(
        &self,
        cmd: VerifyOrderPaymentCommand,
    ) -> Result<VerifyOrderPaymentResult, PaymentError> {
        let reference = PaymentReference::parse(cmd.reference)?;
        if reference.kind() != Some(ReferenceKind::Order) {
            return Err(PaymentError::reference_not_found(reference.as_str()));
        }

        let transaction = self
            .transactions
            .find_by_reference(&reference)
            .await?
            .ok_or_else(|| PaymentError::reference_not_found(reference.as_str()))?;
        let order = self
            .orders
            .find_by_id(&transaction.order_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Order", transaction.order_id))?;
        if !order.is_participant(&cmd.user_id) {
            return Err(PaymentError::forbidden(format!(
                "user {} is not part of order {}",
                cmd.user_id, order.id
            )));
        }

        // Terminal rows are answered locally; no gateway round trip.
        match transaction.status {
            TransactionStatus::Success => {
                return Ok(VerifyOrderPaymentResult {
                    reference,
                    outcome: OutcomeKind::AlreadyProcessed,
                    settlement: None,
                })
            }
            TransactionStatus::Failed => {
                return Err(PaymentError::VerificationFailed {
                    reference: reference.to_string(),
                    status: TransactionStatus::Failed.to_string(),
                })
            }
            TransactionStatus::Initialized => {}
        }

        let verification = self.gateway.verify(&reference).await?;
        let request = SettlementRequest::new(reference.clone(), verification.status)
            .with_gateway_response(verification.raw);

        match self.settle.handle(request).await? {
            SettlementOutcome::Settled(settlement) => Ok(VerifyOrderPaymentResult {
                reference,
                outcome: OutcomeKind::Settled,
                settlement: Some(settlement),
            }),
            SettlementOutcome::AlreadyProcessed => Ok(VerifyOrderPaymentResult {
                reference,
                outcome: OutcomeKind::AlreadyProcessed,
                settlement: None,
            }),
            SettlementOutcome::Unapplied(_) => Ok(VerifyOrderPaymentResult {
                reference,
                outcome: OutcomeKind::Unapplied,
                settlement: None,
            }),
            SettlementOutcome::Failed | SettlementOutcome::Pending => Err(PaymentError::VerificationFailed {
                reference: reference.to_string(),
                status: verification.status.to_string(),
            }),
        }
    }
}
