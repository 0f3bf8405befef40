//! Ledger module - farmer wallets and the append-only record of money moved.

mod transaction;
mod wallet;

pub use transaction::{LedgerEntryStatus, LedgerEntryType, LedgerTransaction};
pub use wallet::Wallet;
