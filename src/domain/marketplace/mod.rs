//! Marketplace module - orders, their payment attempts, and settlement.

mod crop;
mod order;
mod order_status;
mod order_transaction;
mod settlement;

pub use crop::{Crop, StockDeduction};
pub use order::{Order, OrderAction};
pub use order_status::OrderStatus;
pub use order_transaction::OrderTransaction;
pub use settlement::{record_unapplied_charge, settle_order_payment, OrderSettlement};
