//! VerifySubscriptionPaymentHandler - Polls the gateway and settles a
//! subscription payment.

use std::sync::Arc;

use crate::domain::billing::SubscriptionSettlement;
use crate::domain::foundation::UserId;
use crate::domain::payment::{
    OutcomeKind, PaymentError, PaymentReference, ReferenceKind, SettlementOutcome, TransactionStatus,
};
use crate::ports::{BillingTransactionRepository, PaymentGateway, SettlementRequest};

use super::SettleSubscriptionPaymentHandler;

#[derive(Debug, Clone)]
pub struct VerifySubscriptionPaymentCommand {
    pub user_id: UserId,
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct VerifySubscriptionPaymentResult {
    pub reference: PaymentReference,
    pub outcome: OutcomeKind,
    pub settlement: Option<SubscriptionSettlement>,
}

pub struct VerifySubscriptionPaymentHandler {
    transactions: Arc<dyn BillingTransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settle: Arc<SettleSubscriptionPaymentHandler>,
}

impl VerifySubscriptionPaymentHandler {
    pub fn new(
        transactions: Arc<dyn BillingTransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settle: Arc<SettleSubscriptionPaymentHandler>,
    ) -> Self {
        Self {
            transactions,
            gateway,
            settle,
        }
    }

    /// # Errors
    ///
    /// - `VerificationFailed` if the gateway reports failure or no final status
    /// - `GatewayUnavailable` on outage; the transaction stays retryable
    pub async fn handle(
        &self,
        cmd: VerifySubscriptionPaymentCommand,
    ) -> Result<VerifySubscriptionPaymentResult, PaymentError> {
        let reference = PaymentReference::parse(cmd.reference)?;
        if reference.kind() != Some(ReferenceKind::Subscription) {
            return Err(PaymentError::reference_not_found(reference.as_str()));
        }

        let transaction = self
            .transactions
            .find_by_reference(&reference)
            .await?
            .ok_or_else(|| PaymentError::reference_not_found(reference.as_str()))?;
        if transaction.user_id != cmd.user_id {
            return Err(PaymentError::forbidden(format!(
                "payment {} belongs to another user",
                reference
            )));
        }

        match transaction.status {
            TransactionStatus::Success => {
                return Ok(VerifySubscriptionPaymentResult {
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
            SettlementOutcome::Settled(settlement) => Ok(VerifySubscriptionPaymentResult {
                reference,
                outcome: OutcomeKind::Settled,
                settlement: Some(settlement),
            }),
            SettlementOutcome::AlreadyProcessed => Ok(VerifySubscriptionPaymentResult {
                reference,
                outcome: OutcomeKind::AlreadyProcessed,
                settlement: None,
            }),
            SettlementOutcome::Unapplied(_) => Ok(VerifySubscriptionPaymentResult {
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
