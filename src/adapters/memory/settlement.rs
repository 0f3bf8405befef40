//! Settlement on the in-memory store.
//!
//! Works on clones of the stored rows and writes them back only after the
//! domain settlement succeeded, so an error leaves the store untouched.
//! A charge for an order that is no longer payable writes only the closed
//! transaction.

use async_trait::async_trait;

use crate::domain::billing::{self, SubscriptionSettlement};
use crate::domain::ledger::Wallet;
use crate::domain::marketplace::{self, OrderSettlement};
use crate::domain::payment::{admit, Admission, PaymentError, SettlementOutcome, TransactionStatus};
use crate::ports::{SettlementRequest, SettlementStore};

use super::InMemoryMarketplaceStore;

#[async_trait]
impl SettlementStore for InMemoryMarketplaceStore {
    async fn settle_order_payment(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome<OrderSettlement>, PaymentError> {
        let mut state = self.state.lock().await;

        let mut transaction = state
            .order_transactions
            .get(&request.reference)
            .cloned()
            .ok_or_else(|| PaymentError::reference_not_found(request.reference.as_str()))?;

        let target = match admit(&request.reference, transaction.status, request.status) {
            Admission::Proceed { target } => target,
            Admission::Pending => return Ok(SettlementOutcome::Pending),
            Admission::AlreadyProcessed { .. } => return Ok(SettlementOutcome::AlreadyProcessed),
        };

        if target == TransactionStatus::Failed {
            transaction.settle(TransactionStatus::Failed, request.gateway_response, request.at)?;
            tracing::info!(reference = %request.reference, "Order payment failed at gateway");
            state
                .order_transactions
                .insert(request.reference.clone(), transaction);
            return Ok(SettlementOutcome::Failed);
        }

        let mut order = state
            .orders
            .get(&transaction.order_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("order", transaction.order_id))?;
        if !order.is_payable() {
            let anomaly = marketplace::record_unapplied_charge(
                &mut transaction,
                &order,
                request.gateway_response,
                request.at,
            )?;
            state
                .order_transactions
                .insert(request.reference.clone(), transaction);
            return Ok(SettlementOutcome::Unapplied(anomaly));
        }

        let mut crop = state
            .crops
            .get(&order.crop_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("crop", order.crop_id))?;
        let mut wallet = state
            .wallets
            .get(&order.farmer_id)
            .cloned()
            .unwrap_or_else(|| Wallet::open(order.farmer_id));

        let (settlement, entry) = marketplace::settle_order_payment(
            &mut transaction,
            &mut order,
            &mut crop,
            &mut wallet,
            request.gateway_response,
            request.at,
        )?;

        if state.ledger.iter().any(|e| e.reference == entry.reference) {
            tracing::info!(reference = %request.reference, "Ledger already holds reference");
            return Ok(SettlementOutcome::AlreadyProcessed);
        }

        state
            .order_transactions
            .insert(request.reference.clone(), transaction);
        state.orders.insert(order.id, order);
        state.crops.insert(crop.id, crop);
        state.wallets.insert(wallet.farmer_id, wallet);
        state.ledger.push(entry);

        Ok(SettlementOutcome::Settled(settlement))
    }

    async fn settle_subscription_payment(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome<SubscriptionSettlement>, PaymentError> {
        let mut state = self.state.lock().await;

        let mut transaction = state
            .billing_transactions
            .get(&request.reference)
            .cloned()
            .ok_or_else(|| PaymentError::reference_not_found(request.reference.as_str()))?;

        let target = match admit(&request.reference, transaction.status, request.status) {
            Admission::Proceed { target } => target,
            Admission::Pending => return Ok(SettlementOutcome::Pending),
            Admission::AlreadyProcessed { .. } => return Ok(SettlementOutcome::AlreadyProcessed),
        };

        if target == TransactionStatus::Failed {
            transaction.settle(TransactionStatus::Failed, request.gateway_response, request.at)?;
            tracing::info!(reference = %request.reference, "Subscription payment failed at gateway");
            state
                .billing_transactions
                .insert(request.reference.clone(), transaction);
            return Ok(SettlementOutcome::Failed);
        }

        let mut subscription = state
            .subscriptions
            .get(&transaction.subscription_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("subscription", transaction.subscription_id))?;
        let plan = state
            .plans
            .get(&subscription.plan_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("plan", subscription.plan_id))?;

        let settlement = billing::settle_subscription_payment(
            &mut transaction,
            &mut subscription,
            &plan,
            request.customer,
            request.gateway_response,
            request.at,
        )?;

        state
            .billing_transactions
            .insert(request.reference.clone(), transaction);
        state.subscriptions.insert(subscription.id, subscription);

        Ok(SettlementOutcome::Settled(settlement))
    }
}
