//! Payment transaction status and gateway-reported status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Local status of a billing or order payment transaction.
///
/// `initialized → {success, failed}`; both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Initialized,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Initialized => "initialized",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!((self, target), (Initialized, Success) | (Initialized, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Initialized => vec![Success, Failed],
            Success | Failed => vec![],
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "initialized" => Ok(TransactionStatus::Initialized),
            "success" => Ok(TransactionStatus::Success),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "transaction_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// Payment status as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    /// Charge captured.
    Success,
    /// Charge definitively did not go through.
    Failed,
    /// Still in flight on the gateway side; nothing to settle yet.
    Pending,
}

impl GatewayStatus {
    /// Maps a raw gateway status string.
    pub fn from_gateway(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => GatewayStatus::Success,
            "failed" | "reversed" | "abandoned" => GatewayStatus::Failed,
            _ => GatewayStatus::Pending,
        }
    }

    /// The local terminal status this gateway status settles into.
    pub fn settles_to(&self) -> Option<TransactionStatus> {
        match self {
            GatewayStatus::Success => Some(TransactionStatus::Success),
            GatewayStatus::Failed => Some(TransactionStatus::Failed),
            GatewayStatus::Pending => None,
        }
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GatewayStatus::Success => "success",
            GatewayStatus::Failed => "failed",
            GatewayStatus::Pending => "pending",
        };
        write!(f, "{}", s)
    }
}
