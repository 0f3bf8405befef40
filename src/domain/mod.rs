//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, money, timestamps, errors, state machines)
//! - `payment` - References, gateway statuses, webhook events, idempotency
//! - `marketplace` - Crops, orders and order payment settlement
//! - `ledger` - Farmer wallets and ledger entries
//! - `billing` - Plans, subscriptions and subscription payment settlement

pub mod billing;
pub mod foundation;
pub mod ledger;
pub mod marketplace;
pub mod payment;
