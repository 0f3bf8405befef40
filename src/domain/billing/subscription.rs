//! Subscription aggregate.
//!
//! # Design Decisions
//!
//! - **Created inactive**: a subscription exists from plan selection but
//!   grants nothing until its first payment settles
//! - **Fresh period on every activation**: `activate` always recomputes
//!   `end_date` from the new `paid_at`; a renewal does not stack onto the
//!   remaining period
//! - **No refunds**: cancelling ends access immediately and moves no money

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, StateMachine, SubscriptionId, Timestamp, UserId};
use crate::domain::payment::PaymentError;

use super::{PlanInterval, SubscriptionStatus};

/// # Invariants
///
/// - `end_date >= start_date` whenever both are set
/// - Status transitions follow [`SubscriptionStatus`] edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    /// Reference of the payment that last activated this subscription.
    pub external_reference: Option<String>,
    /// Gateway customer code of the payer.
    pub external_customer: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates an unpaid subscription to a plan.
    pub fn create(user_id: UserId, plan_id: PlanId) -> Self {
        let now = Timestamp::now();
        Self {
            id: SubscriptionId::new(),
            user_id,
            plan_id,
            status: SubscriptionStatus::Inactive,
            start_date: None,
            end_date: None,
            external_reference: None,
            external_customer: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Starts a paid period at `paid_at`.
    ///
    /// `end_date = paid_at + 30 days` for monthly plans, `+ 365 days` for
    /// yearly ones.
    pub fn activate(&mut self, interval: PlanInterval, paid_at: Timestamp) -> Result<(), PaymentError> {
        self.transition_to(SubscriptionStatus::Active)?;
        self.start_date = Some(paid_at);
        self.end_date = Some(paid_at.add_days(interval.period_days()));
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Ends the subscription now.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), PaymentError> {
        self.transition_to(SubscriptionStatus::Canceled)?;
        self.end_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Flags a failed renewal charge.
    pub fn mark_past_due(&mut self) -> Result<(), PaymentError> {
        self.transition_to(SubscriptionStatus::PastDue)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Cancels an active subscription whose period has run out, keeping
    /// the original `end_date`. Returns whether anything changed.
    pub fn expire_if_lapsed(&mut self, now: Timestamp) -> Result<bool, PaymentError> {
        let lapsed = self.status == SubscriptionStatus::Active
            && self.end_date.map(|end| !end.is_after(&now)).unwrap_or(false);
        if !lapsed {
            return Ok(false);
        }
        self.transition_to(SubscriptionStatus::Canceled)?;
        self.updated_at = now;
        Ok(true)
    }

    /// Access check: active and not past its end date.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.status == SubscriptionStatus::Active
            && self.end_date.map(|end| end.is_after(&now)).unwrap_or(true)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Timestamp::now())
    }

    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), PaymentError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| PaymentError::invalid_transition("subscription", e))?;
        Ok(())
    }
}
