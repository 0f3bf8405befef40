//! Payment references.
//!
//! A reference is the key shared with the gateway for one payment attempt.
//! It is generated locally, sent with the initialize call, echoed back in
//! webhooks and verify responses, and finally reused as the ledger entry's
//! de-duplication key. The prefix tells which settlement path owns it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

const ORDER_PREFIX: &str = "ORD_";
const SUBSCRIPTION_PREFIX: &str = "SUB_";

/// Which settlement path a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Order,
    Subscription,
}

impl ReferenceKind {
    fn prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Order => ORDER_PREFIX,
            ReferenceKind::Subscription => SUBSCRIPTION_PREFIX,
        }
    }
}

/// Globally unique, immutable payment reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    /// Generates a fresh reference for the given path.
    pub fn generate(kind: ReferenceKind) -> Self {
        Self(format!("{}{}", kind.prefix(), Uuid::new_v4().simple()))
    }

    /// Wraps a reference received from the outside world.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("reference"));
        }
        if trimmed.len() > 100 {
            return Err(ValidationError::invalid_format(
                "reference",
                "longer than 100 characters",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The owning settlement path, or `None` for a reference we never issued.
    pub fn kind(&self) -> Option<ReferenceKind> {
        if self.0.starts_with(ORDER_PREFIX) {
            Some(ReferenceKind::Order)
        } else if self.0.starts_with(SUBSCRIPTION_PREFIX) {
            Some(ReferenceKind::Subscription)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
