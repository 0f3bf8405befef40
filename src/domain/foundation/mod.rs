//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the marketplace ledger domain.

mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CropId, OrderId, PlanId, SubscriptionId, TransactionId, UserId, WalletId};
pub use money::{Amount, Money};
pub use state_machine::{InvalidTransition, StateMachine};
pub use timestamp::Timestamp;
