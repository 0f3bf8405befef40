//! Settlement admission and outcomes.
//!
//! Settlement runs at most once per reference. The store re-reads the
//! transaction row under a lock and asks [`admit`] whether to proceed; only
//! an `initialized` row with a terminal gateway status is admitted. The
//! ledger's unique reference constraint backs this up when two callers race
//! past the read.

use serde::Serialize;

use super::errors::PaymentError;
use super::reference::PaymentReference;
use super::status::{GatewayStatus, TransactionStatus};
use crate::domain::foundation::StateMachine;

/// Decision taken on a locked transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Apply side effects and move the row to `target`.
    Proceed { target: TransactionStatus },
    /// Gateway has no final answer yet; leave the row untouched.
    Pending,
    /// Row already terminal; a previous caller did the work.
    AlreadyProcessed { current: TransactionStatus },
}

/// Decides whether a settlement attempt may run.
pub fn admit(
    reference: &PaymentReference,
    current: TransactionStatus,
    incoming: GatewayStatus,
) -> Admission {
    if current.is_terminal() {
        if incoming.settles_to() != Some(current) {
            tracing::warn!(
                reference = %reference,
                stored = %current,
                reported = %incoming,
                "Gateway reports a different outcome for an already settled transaction"
            );
        } else {
            tracing::info!(reference = %reference, status = %current, "Duplicate settlement ignored");
        }
        return Admission::AlreadyProcessed { current };
    }

    match incoming.settles_to() {
        Some(target) => Admission::Proceed { target },
        None => Admission::Pending,
    }
}

/// Result of one settlement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome<T> {
    /// This call applied the success side effects.
    Settled(T),
    /// This call recorded a gateway-reported failure.
    Failed,
    /// Another call settled the reference first; nothing was written.
    AlreadyProcessed,
    /// Gateway status not final; nothing was written.
    Pending,
    /// Gateway captured the money but the order could no longer take it.
    /// The transaction is closed with the anomaly recorded; no other row
    /// was touched and the charge needs a manual refund.
    Unapplied(PaymentError),
}

impl<T> SettlementOutcome<T> {
    /// True when the payment is (now or previously) settled in our books
    /// from the caller's point of view.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            SettlementOutcome::Settled(_) | SettlementOutcome::AlreadyProcessed
        )
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            SettlementOutcome::Settled(_) => OutcomeKind::Settled,
            SettlementOutcome::Failed => OutcomeKind::Failed,
            SettlementOutcome::AlreadyProcessed => OutcomeKind::AlreadyProcessed,
            SettlementOutcome::Pending => OutcomeKind::Pending,
            SettlementOutcome::Unapplied(_) => OutcomeKind::Unapplied,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SettlementOutcome<U> {
        match self {
            SettlementOutcome::Settled(v) => SettlementOutcome::Settled(f(v)),
            SettlementOutcome::Failed => SettlementOutcome::Failed,
            SettlementOutcome::AlreadyProcessed => SettlementOutcome::AlreadyProcessed,
            SettlementOutcome::Pending => SettlementOutcome::Pending,
            SettlementOutcome::Unapplied(err) => SettlementOutcome::Unapplied(err),
        }
    }
}

/// Payload-free view of an outcome, for responses and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Settled,
    Failed,
    AlreadyProcessed,
    Pending,
    Unapplied,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutcomeKind::Settled => "settled",
            OutcomeKind::Failed => "failed",
            OutcomeKind::AlreadyProcessed => "already_processed",
            OutcomeKind::Pending => "pending",
            OutcomeKind::Unapplied => "unapplied",
        };
        write!(f, "{}", s)
    }
}
