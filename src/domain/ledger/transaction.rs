//! Immutable ledger entries.
//!
//! One entry is written per settled order payment. Its `reference` is the
//! gateway reference of the payment and is unique across the ledger, which
//! makes the entry itself the proof that a credit was applied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Money, Timestamp, TransactionId, UserId, ValidationError, WalletId};
use crate::domain::payment::PaymentReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    Payment,
    Withdrawal,
    Refund,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Payment => "PAYMENT",
            LedgerEntryType::Withdrawal => "WITHDRAWAL",
            LedgerEntryType::Refund => "REFUND",
        }
    }
}

impl FromStr for LedgerEntryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAYMENT" => Ok(LedgerEntryType::Payment),
            "WITHDRAWAL" => Ok(LedgerEntryType::Withdrawal),
            "REFUND" => Ok(LedgerEntryType::Refund),
            other => Err(ValidationError::invalid_format(
                "entry_type",
                format!("unknown ledger entry type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryStatus {
    Pending,
    Success,
    Failed,
}

impl LedgerEntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryStatus::Pending => "PENDING",
            LedgerEntryStatus::Success => "SUCCESS",
            LedgerEntryStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for LedgerEntryStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(LedgerEntryStatus::Pending),
            "SUCCESS" => Ok(LedgerEntryStatus::Success),
            "FAILED" => Ok(LedgerEntryStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown ledger entry status '{}'", other),
            )),
        }
    }
}

impl fmt::Display for LedgerEntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: TransactionId,
    /// The paying user.
    pub user_id: UserId,
    /// The credited wallet.
    pub wallet_id: WalletId,
    pub amount: Money,
    pub reference: PaymentReference,
    pub entry_type: LedgerEntryType,
    pub status: LedgerEntryStatus,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

impl LedgerTransaction {
    /// A successful incoming payment credited to `wallet_id`.
    pub fn payment(
        user_id: UserId,
        wallet_id: WalletId,
        amount: Money,
        reference: PaymentReference,
        description: impl Into<String>,
        metadata: serde_json::Value,
        at: Timestamp,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            wallet_id,
            amount,
            reference,
            entry_type: LedgerEntryType::Payment,
            status: LedgerEntryStatus::Success,
            description: description.into(),
            metadata,
            created_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::ReferenceKind;
    use rust_decimal_macros::dec;

    #[test]
    fn payment_entry_is_successful_payment() {
        let reference = PaymentReference::generate(ReferenceKind::Order);
        let entry = LedgerTransaction::payment(
            UserId::new(),
            WalletId::new(),
            Money::new(dec!(10000)).unwrap(),
            reference.clone(),
            "Payment for Order #1: Maize",
            serde_json::json!({"order_id": "1"}),
            Timestamp::now(),
        );

        assert_eq!(entry.entry_type, LedgerEntryType::Payment);
        assert_eq!(entry.status, LedgerEntryStatus::Success);
        assert_eq!(entry.reference, reference);
    }

    #[test]
    fn entry_type_roundtrips_through_storage_string() {
        for t in [
            LedgerEntryType::Payment,
            LedgerEntryType::Withdrawal,
            LedgerEntryType::Refund,
        ] {
            assert_eq!(t.as_str().parse::<LedgerEntryType>().unwrap(), t);
        }
        assert!("payment".parse::<LedgerEntryType>().is_err());
    }

    #[test]
    fn entry_status_parses_storage_string() {
        assert_eq!(
            "SUCCESS".parse::<LedgerEntryStatus>().unwrap(),
            LedgerEntryStatus::Success
        );
    }
}
