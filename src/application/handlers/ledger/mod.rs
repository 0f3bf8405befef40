//! Ledger query handlers. The ledger is written only by settlement.

mod get_wallet;
mod list_ledger_history;

pub use get_wallet::{GetWalletHandler, GetWalletQuery, WalletView};
pub use list_ledger_history::{ListLedgerHistoryHandler, ListLedgerHistoryQuery};
