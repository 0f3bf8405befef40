//! Side effects of a successful order payment.
//!
//! [`settle_order_payment`] mutates loaded copies of every row the payment
//! touches. The store calling it is responsible for having locked those rows
//! and for persisting all of them, plus the returned ledger entry, in one
//! transaction. If this function returns an error, nothing may be written.
//!
//! A captured charge can also arrive after the order left `ACCEPTED` (the
//! buyer cancelled mid-checkout, or a second checkout was paid).
//! [`record_unapplied_charge`] closes such a transaction without touching
//! the order, stock, wallet or ledger, so redelivery stops.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::foundation::{Amount, CropId, Money, OrderId, Timestamp, TransactionId, UserId, WalletId};
use crate::domain::ledger::{LedgerTransaction, Wallet};
use crate::domain::payment::{PaymentError, PaymentReference, TransactionStatus};

use super::{Crop, Order, OrderTransaction};

/// Summary of one applied order settlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSettlement {
    pub reference: PaymentReference,
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub farmer_id: UserId,
    pub crop_id: CropId,
    pub crop_name: String,
    pub amount: Money,
    pub wallet_id: WalletId,
    pub wallet_balance: Money,
    pub ledger_entry_id: TransactionId,
    pub remaining_stock: Decimal,
    /// Problems recorded but not reversed, e.g. stock going negative.
    #[serde(skip)]
    pub anomalies: Vec<PaymentError>,
}

impl OrderSettlement {
    pub fn out_of_stock(&self) -> bool {
        self.remaining_stock <= Decimal::ZERO
    }
}

/// Applies a successful payment to an order and its counterparties.
///
/// Order of effects: order to `PAID`, transaction to `success`, stock
/// decrement, wallet credit, ledger entry with the payment reference.
///
/// # Errors
///
/// - `InvalidStateTransition` if the order is no longer `ACCEPTED` or the
///   transaction is already terminal
/// - `Infrastructure` if the loaded rows do not belong together
pub fn settle_order_payment(
    transaction: &mut OrderTransaction,
    order: &mut Order,
    crop: &mut Crop,
    wallet: &mut Wallet,
    gateway_response: Option<serde_json::Value>,
    at: Timestamp,
) -> Result<(OrderSettlement, LedgerTransaction), PaymentError> {
    if transaction.order_id != order.id || order.crop_id != crop.id || wallet.farmer_id != order.farmer_id {
        return Err(PaymentError::infrastructure(format!(
            "settlement rows for {} do not belong together",
            transaction.reference
        )));
    }

    order.mark_paid()?;
    transaction.settle(TransactionStatus::Success, gateway_response, at)?;

    let mut anomalies = Vec::new();
    let available = crop.quantity_kg;
    let deduction = crop.deduct_stock(order.quantity_kg, at);
    if deduction.shortfall.is_some() {
        let anomaly = PaymentError::InsufficientInventory {
            crop_id: crop.id,
            available,
            requested: order.quantity_kg,
        };
        tracing::error!(
            reference = %transaction.reference,
            order_id = %order.id,
            error = %anomaly,
            "Paid order exceeded stock; stock left negative"
        );
        anomalies.push(anomaly);
    }

    let credit = Amount::try_from(order.total_price)?;
    wallet.credit(credit, at);

    let entry = LedgerTransaction::payment(
        order.buyer_id,
        wallet.id,
        order.total_price,
        transaction.reference.clone(),
        format!("Payment for Order #{}: {}", order.id, order.crop_name),
        serde_json::json!({ "order_id": order.id.to_string() }),
        at,
    );

    let settlement = OrderSettlement {
        reference: transaction.reference.clone(),
        order_id: order.id,
        buyer_id: order.buyer_id,
        farmer_id: order.farmer_id,
        crop_id: crop.id,
        crop_name: order.crop_name.clone(),
        amount: order.total_price,
        wallet_id: wallet.id,
        wallet_balance: wallet.balance,
        ledger_entry_id: entry.id,
        remaining_stock: deduction.remaining,
        anomalies,
    };

    Ok((settlement, entry))
}

/// Closes a successful charge whose order can no longer take payment.
///
/// The transaction moves to `success` with the anomaly stored under
/// `metadata.anomaly`; the caller persists only the transaction. Returns the
/// anomaly so it can be reported.
///
/// # Errors
///
/// - `Infrastructure` if the transaction is not for this order
/// - `InvalidStateTransition` if the transaction is already terminal
pub fn record_unapplied_charge(
    transaction: &mut OrderTransaction,
    order: &Order,
    gateway_response: Option<serde_json::Value>,
    at: Timestamp,
) -> Result<PaymentError, PaymentError> {
    if transaction.order_id != order.id {
        return Err(PaymentError::infrastructure(format!(
            "transaction {} does not belong to order {}",
            transaction.reference, order.id
        )));
    }

    transaction.settle(TransactionStatus::Success, gateway_response, at)?;

    let anomaly = PaymentError::OrderNotPayable {
        order_id: order.id.to_string(),
        status: order.status.to_string(),
    };
    if let Some(metadata) = transaction.metadata.as_object_mut() {
        metadata.insert(
            "anomaly".into(),
            serde_json::json!({
                "code": anomaly.code(),
                "message": anomaly.to_string(),
                "order_status": order.status.to_string(),
                "recorded_at": at.as_datetime().to_rfc3339(),
            }),
        );
    }
    tracing::error!(
        reference = %transaction.reference,
        order_id = %order.id,
        order_status = %order.status,
        amount_minor = transaction.amount_minor,
        error = %anomaly,
        "Charge captured for an order that is no longer payable; refund required"
    );
    Ok(anomaly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::LedgerEntryType;
    use crate::domain::marketplace::{OrderAction, OrderStatus};
    use rust_decimal_macros::dec;

    struct Fixture {
        transaction: OrderTransaction,
        order: Order,
        crop: Crop,
        wallet: Wallet,
    }

    fn fixture(stock: Decimal, quantity: Decimal) -> Fixture {
        let farmer = UserId::new();
        let mut crop = Crop::new(farmer, "Maize", Money::new(dec!(1000)).unwrap(), stock.max(quantity));
        let mut order = Order::place(UserId::new(), &crop, quantity).unwrap();
        order.apply(OrderAction::Accept, &farmer).unwrap();
        crop.quantity_kg = stock;
        let transaction = OrderTransaction::initialize(&order, "NGN").unwrap();
        Fixture {
            transaction,
            order,
            crop,
            wallet: Wallet::open(farmer),
        }
    }

    #[test]
    fn success_applies_every_effect() {
        let mut f = fixture(dec!(100), dec!(10));
        let (settlement, entry) = settle_order_payment(
            &mut f.transaction,
            &mut f.order,
            &mut f.crop,
            &mut f.wallet,
            None,
            Timestamp::now(),
        )
        .unwrap();

        assert_eq!(f.order.status, OrderStatus::Paid);
        assert_eq!(f.transaction.status, TransactionStatus::Success);
        assert_eq!(f.crop.quantity_kg, dec!(90));
        assert_eq!(f.wallet.balance.value(), dec!(10000));

        assert_eq!(entry.reference, f.transaction.reference);
        assert_eq!(entry.entry_type, LedgerEntryType::Payment);
        assert_eq!(entry.user_id, f.order.buyer_id);
        assert_eq!(entry.description, format!("Payment for Order #{}: Maize", f.order.id));
        assert!(settlement.anomalies.is_empty());
        assert!(!settlement.out_of_stock());
    }

    #[test]
    fn shortfall_is_recorded_but_settlement_proceeds() {
        let mut f = fixture(dec!(4), dec!(10));
        let (settlement, _) = settle_order_payment(
            &mut f.transaction,
            &mut f.order,
            &mut f.crop,
            &mut f.wallet,
            None,
            Timestamp::now(),
        )
        .unwrap();

        assert_eq!(f.crop.quantity_kg, dec!(-6));
        assert_eq!(f.wallet.balance.value(), dec!(10000));
        assert!(matches!(
            settlement.anomalies.as_slice(),
            [PaymentError::InsufficientInventory { .. }]
        ));
        assert!(settlement.out_of_stock());
    }

    #[test]
    fn cancelled_order_is_rejected() {
        let mut f = fixture(dec!(100), dec!(10));
        let buyer = f.order.buyer_id;
        f.order.apply(OrderAction::Cancel, &buyer).unwrap();

        let err = settle_order_payment(
            &mut f.transaction,
            &mut f.order,
            &mut f.crop,
            &mut f.wallet,
            None,
            Timestamp::now(),
        )
        .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidStateTransition { .. }));
    }

    #[test]
    fn unapplied_charge_closes_only_the_transaction() {
        let mut f = fixture(dec!(100), dec!(10));
        let buyer = f.order.buyer_id;
        f.order.apply(OrderAction::Cancel, &buyer).unwrap();

        let anomaly = record_unapplied_charge(
            &mut f.transaction,
            &f.order,
            Some(serde_json::json!({"status": "success"})),
            Timestamp::now(),
        )
        .unwrap();

        assert_eq!(anomaly.code(), "ORDER_NOT_PAYABLE");
        assert_eq!(f.transaction.status, TransactionStatus::Success);
        assert_eq!(f.order.status, OrderStatus::Cancelled);
        let recorded = f.transaction.anomaly().unwrap();
        assert_eq!(recorded["code"], "ORDER_NOT_PAYABLE");
        assert_eq!(recorded["order_status"], OrderStatus::Cancelled.to_string());
    }

    #[test]
    fn unapplied_charge_cannot_reopen_a_terminal_transaction() {
        let mut f = fixture(dec!(100), dec!(10));
        f.transaction
            .settle(TransactionStatus::Failed, None, Timestamp::now())
            .unwrap();
        let result = record_unapplied_charge(&mut f.transaction, &f.order, None, Timestamp::now());
        assert!(matches!(result, Err(PaymentError::InvalidStateTransition { .. })));
    }

    #[test]
    fn mismatched_wallet_is_rejected() {
        let mut f = fixture(dec!(100), dec!(10));
        let mut other_wallet = Wallet::open(UserId::new());
        let result = settle_order_payment(
            &mut f.transaction,
            &mut f.order,
            &mut f.crop,
            &mut other_wallet,
            None,
            Timestamp::now(),
        );
        assert!(matches!(result, Err(PaymentError::Infrastructure(_))));
    }
}
