//! Subscription status state machine.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Created, never paid.
    Inactive,
    Trialing,
    Active,
    /// Renewal charge failed.
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From INACTIVE
            (Inactive, Active)
                | (Inactive, Trialing)
                | (Inactive, Canceled)
            // From TRIALING
                | (Trialing, Active)
                | (Trialing, PastDue)
                | (Trialing, Canceled)
            // From ACTIVE
                | (Active, Active) // Renewal
                | (Active, PastDue)
                | (Active, Canceled)
            // From PAST_DUE
                | (PastDue, Active)
                | (PastDue, Canceled)
            // From CANCELED
                | (Canceled, Active) // Reactivation by a new payment
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Inactive => vec![Active, Trialing, Canceled],
            Trialing => vec![Active, PastDue, Canceled],
            Active => vec![Active, PastDue, Canceled],
            PastDue => vec![Active, Canceled],
            Canceled => vec![Active],
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inactive" => Ok(SubscriptionStatus::Inactive),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            other => Err(ValidationError::invalid_format(
                "subscription_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_can_activate() {
        assert_eq!(
            SubscriptionStatus::Inactive.transition_to(SubscriptionStatus::Active),
            Ok(SubscriptionStatus::Active)
        );
    }

    #[test]
    fn inactive_cannot_be_past_due() {
        assert!(SubscriptionStatus::Inactive
            .transition_to(SubscriptionStatus::PastDue)
            .is_err());
    }

    #[test]
    fn active_can_renew() {
        assert!(SubscriptionStatus::Active.can_transition_to(&SubscriptionStatus::Active));
    }

    #[test]
    fn past_due_can_recover_on_renewal() {
        assert!(SubscriptionStatus::PastDue.can_transition_to(&SubscriptionStatus::Active));
    }

    #[test]
    fn canceled_only_reactivates() {
        assert_eq!(
            SubscriptionStatus::Canceled.valid_transitions(),
            vec![SubscriptionStatus::Active]
        );
        assert!(!SubscriptionStatus::Canceled.can_transition_to(&SubscriptionStatus::Inactive));
    }

    #[test]
    fn no_status_is_terminal() {
        for status in [
            SubscriptionStatus::Inactive,
            SubscriptionStatus::Trialing,
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
        ] {
            assert!(!status.is_terminal());
            assert_eq!(status.as_str().parse::<SubscriptionStatus>().unwrap(), status);
        }
    }
}
