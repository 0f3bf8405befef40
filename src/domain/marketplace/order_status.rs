//! Order status state machine.
//!
//! Orders only move forward. Settlement is the only path into `Paid`.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed by the buyer, awaiting the farmer.
    Pending,
    /// Farmer agreed to fill the order; buyer may now pay.
    Accepted,
    /// Farmer turned the order down.
    Declined,
    /// Payment settled.
    Paid,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Declined,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Declined => "DECLINED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Accepted)
                | (Pending, Declined)
                | (Pending, Cancelled)
            // From ACCEPTED
                | (Accepted, Paid)
                | (Accepted, Cancelled)
            // From PAID
                | (Paid, Shipped)
                | (Paid, Cancelled)
            // From SHIPPED
                | (Shipped, Completed)
                | (Shipped, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Pending => vec![Accepted, Declined, Cancelled],
            Accepted => vec![Paid, Cancelled],
            Paid => vec![Shipped, Cancelled],
            Shipped => vec![Completed, Cancelled],
            Declined | Completed | Cancelled => vec![],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ValidationError::invalid_format("order_status", format!("unknown status '{}'", s))
            })
    }
}
