//! Row types shared by the PostgreSQL repositories and the settlement store.
//!
//! Status and enum columns are stored as their `as_str()` text; parsing a
//! value the domain does not know is a `DatabaseError`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::billing::{BillingTransaction, Plan, Subscription};
use crate::domain::foundation::{
    CropId, DomainError, ErrorCode, Money, OrderId, PlanId, SubscriptionId, Timestamp,
    TransactionId, UserId, WalletId,
};
use crate::domain::ledger::{LedgerTransaction, Wallet};
use crate::domain::marketplace::{Crop, Order, OrderTransaction};
use crate::domain::payment::PaymentReference;

pub(super) fn parse_column<T>(column: &str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} value '{}': {}", column, raw, e),
        )
    })
}

fn money(column: &str, value: Decimal) -> Result<Money, DomainError> {
    Money::new(value).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid {}: {}", column, e))
    })
}

fn reference(raw: String) -> Result<PaymentReference, DomainError> {
    PaymentReference::parse(raw).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid reference: {}", e))
    })
}

fn ts(value: DateTime<Utc>) -> Timestamp {
    Timestamp::from_datetime(value)
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PlanRow {
    id: Uuid,
    name: String,
    tier: i16,
    user_type: String,
    price_minor: i64,
    #[sqlx(rename = "billing_interval")]
    interval: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for Plan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(Plan {
            id: PlanId::from_uuid(row.id),
            name: row.name,
            tier: row.tier,
            user_type: parse_column("user_type", &row.user_type)?,
            price_minor: row.price_minor,
            interval: parse_column("interval", &row.interval)?,
            description: row.description,
            created_at: ts(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan_id: Uuid,
    status: String,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    external_reference: Option<String>,
    external_customer: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            plan_id: PlanId::from_uuid(row.plan_id),
            status: parse_column("subscription status", &row.status)?,
            start_date: row.start_date.map(ts),
            end_date: row.end_date.map(ts),
            external_reference: row.external_reference,
            external_customer: row.external_customer,
            created_at: ts(row.created_at),
            updated_at: ts(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct BillingTransactionRow {
    id: Uuid,
    user_id: Uuid,
    subscription_id: Uuid,
    reference: String,
    amount_minor: i64,
    currency: String,
    status: String,
    metadata: serde_json::Value,
    gateway_response: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
}

impl TryFrom<BillingTransactionRow> for BillingTransaction {
    type Error = DomainError;

    fn try_from(row: BillingTransactionRow) -> Result<Self, Self::Error> {
        Ok(BillingTransaction {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            reference: reference(row.reference)?,
            amount_minor: row.amount_minor,
            currency: row.currency,
            status: parse_column("transaction status", &row.status)?,
            metadata: row.metadata,
            gateway_response: row.gateway_response,
            created_at: ts(row.created_at),
            verified_at: row.verified_at.map(ts),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CropRow {
    id: Uuid,
    farmer_id: Uuid,
    name: String,
    price_per_kg: Decimal,
    quantity_kg: Decimal,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CropRow> for Crop {
    type Error = DomainError;

    fn try_from(row: CropRow) -> Result<Self, Self::Error> {
        Ok(Crop {
            id: CropId::from_uuid(row.id),
            farmer_id: UserId::from_uuid(row.farmer_id),
            name: row.name,
            price_per_kg: money("price_per_kg", row.price_per_kg)?,
            quantity_kg: row.quantity_kg,
            updated_at: ts(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OrderRow {
    id: Uuid,
    buyer_id: Uuid,
    farmer_id: Uuid,
    crop_id: Uuid,
    crop_name: String,
    quantity_kg: Decimal,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::from_uuid(row.id),
            buyer_id: UserId::from_uuid(row.buyer_id),
            farmer_id: UserId::from_uuid(row.farmer_id),
            crop_id: CropId::from_uuid(row.crop_id),
            crop_name: row.crop_name,
            quantity_kg: row.quantity_kg,
            total_price: money("total_price", row.total_price)?,
            status: parse_column("order status", &row.status)?,
            created_at: ts(row.created_at),
            updated_at: ts(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OrderTransactionRow {
    id: Uuid,
    order_id: Uuid,
    reference: String,
    amount_minor: i64,
    currency: String,
    status: String,
    metadata: serde_json::Value,
    gateway_response: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderTransactionRow> for OrderTransaction {
    type Error = DomainError;

    fn try_from(row: OrderTransactionRow) -> Result<Self, Self::Error> {
        Ok(OrderTransaction {
            id: TransactionId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            reference: reference(row.reference)?,
            amount_minor: row.amount_minor,
            currency: row.currency,
            status: parse_column("transaction status", &row.status)?,
            metadata: row.metadata,
            gateway_response: row.gateway_response,
            created_at: ts(row.created_at),
            verified_at: row.verified_at.map(ts),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct WalletRow {
    id: Uuid,
    farmer_id: Uuid,
    balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WalletRow> for Wallet {
    type Error = DomainError;

    fn try_from(row: WalletRow) -> Result<Self, Self::Error> {
        Ok(Wallet {
            id: WalletId::from_uuid(row.id),
            farmer_id: UserId::from_uuid(row.farmer_id),
            balance: money("balance", row.balance)?,
            created_at: ts(row.created_at),
            updated_at: ts(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct LedgerTransactionRow {
    id: Uuid,
    user_id: Uuid,
    wallet_id: Uuid,
    amount: Decimal,
    reference: String,
    entry_type: String,
    status: String,
    description: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<LedgerTransactionRow> for LedgerTransaction {
    type Error = DomainError;

    fn try_from(row: LedgerTransactionRow) -> Result<Self, Self::Error> {
        Ok(LedgerTransaction {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            wallet_id: WalletId::from_uuid(row.wallet_id),
            amount: money("amount", row.amount)?,
            reference: reference(row.reference)?,
            entry_type: parse_column("entry_type", &row.entry_type)?,
            status: parse_column("ledger status", &row.status)?,
            description: row.description,
            metadata: row.metadata,
            created_at: ts(row.created_at),
        })
    }
}

/// Maps a unique violation on `constraint` to `DuplicateReference`.
pub(super) fn insert_error(e: sqlx::Error, constraint: &str, what: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some(constraint) {
            return DomainError::new(
                ErrorCode::DuplicateReference,
                format!("{} reference already exists", what),
            );
        }
    }
    DomainError::database(format!("Failed to save {}: {}", what, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::marketplace::OrderStatus;

    #[test]
    fn parse_column_reads_stored_status() {
        let status: OrderStatus = parse_column("order status", "ACCEPTED").unwrap();
        assert_eq!(status, OrderStatus::Accepted);
    }

    #[test]
    fn unknown_stored_value_is_database_error() {
        let err = parse_column::<OrderStatus>("order status", "LOST").unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn negative_balance_row_is_rejected() {
        let row = WalletRow {
            id: Uuid::new_v4(),
            farmer_id: Uuid::new_v4(),
            balance: Decimal::new(-1, 0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(Wallet::try_from(row).is_err());
    }
}
