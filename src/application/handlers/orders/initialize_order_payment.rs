//! InitializeOrderPaymentHandler - Opens a gateway checkout for an accepted order.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, UserId};
use crate::domain::marketplace::OrderTransaction;
use crate::domain::payment::{PaymentError, PaymentReference, TransactionStatus};
use crate::ports::{InitializePaymentRequest, OrderRepository, OrderTransactionRepository, PaymentGateway};

#[derive(Debug, Clone)]
pub struct InitializeOrderPaymentCommand {
    pub buyer_id: UserId,
    pub buyer_email: String,
    pub order_id: OrderId,
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InitializeOrderPaymentResult {
    pub authorization_url: String,
    pub access_code: Option<String>,
    pub reference: PaymentReference,
}

/// Opens a checkout for an accepted order.
///
/// An order has at most one open attempt: a repeated call hands back the
/// checkout of the latest `INITIALIZED` transaction, or retries the gateway
/// with its reference if the first call never got a checkout. Only an order
/// without an open attempt gets a new reference.
///
/// If the gateway call fails the transaction stays `INITIALIZED`; it is
/// never marked failed for an outage.
pub struct InitializeOrderPaymentHandler {
    orders: Arc<dyn OrderRepository>,
    transactions: Arc<dyn OrderTransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    default_callback_url: Option<String>,
}

impl InitializeOrderPaymentHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        transactions: Arc<dyn OrderTransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
        default_callback_url: Option<String>,
    ) -> Self {
        Self {
            orders,
            transactions,
            gateway,
            currency: currency.into(),
            default_callback_url,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitializeOrderPaymentCommand,
    ) -> Result<InitializeOrderPaymentResult, PaymentError> {
        if cmd.buyer_email.trim().is_empty() {
            return Err(PaymentError::validation("email", "payer email is required"));
        }

        let order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Order", cmd.order_id))?;
        if order.buyer_id != cmd.buyer_id {
            return Err(PaymentError::forbidden(format!(
                "only the buyer may pay order {}",
                order.id
            )));
        }

        order.ensure_payable()?;

        let open = self
            .transactions
            .list_for_order(&order.id)
            .await?
            .into_iter()
            .rev()
            .find(|t| t.status == TransactionStatus::Initialized);
        let mut transaction = match open {
            Some(existing) => {
                if let Some((authorization_url, access_code)) = existing.checkout() {
                    tracing::info!(
                        reference = %existing.reference,
                        order_id = %order.id,
                        "Returning open checkout for order"
                    );
                    return Ok(InitializeOrderPaymentResult {
                        authorization_url,
                        access_code,
                        reference: existing.reference,
                    });
                }
                existing
            }
            None => {
                let created = OrderTransaction::initialize(&order, self.currency.clone())?;
                self.transactions.save(&created).await?;
                created
            }
        };

        let session = self
            .gateway
            .initialize(InitializePaymentRequest {
                email: cmd.buyer_email.trim().to_string(),
                amount_minor: transaction.amount_minor,
                currency: transaction.currency.clone(),
                reference: transaction.reference.clone(),
                callback_url: cmd.callback_url.or_else(|| self.default_callback_url.clone()),
                metadata: Some(transaction.metadata.clone()),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    reference = %transaction.reference,
                    order_id = %order.id,
                    error = %e,
                    "Gateway initialize failed; transaction left initialized"
                );
                e
            })?;

        transaction.record_checkout(&session.authorization_url, session.access_code.as_deref());
        self.transactions.update_metadata(&transaction).await?;

        Ok(InitializeOrderPaymentResult {
            authorization_url: session.authorization_url,
            access_code: session.access_code,
            reference: transaction.reference,
        })
    }
}
