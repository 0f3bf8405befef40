//! Command and query handlers.
//!
//! Each handler owns its ports as `Arc<dyn Port>` and exposes one
//! `handle` method. Settlement handlers are shared between the webhook
//! and the verify paths, so they are passed around as `Arc`.

pub mod billing;
pub mod ledger;
pub mod orders;
pub mod payments;

pub use billing::*;
pub use ledger::*;
pub use orders::*;
pub use payments::*;
