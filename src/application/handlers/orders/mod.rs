//! Order handlers.
//!
//! ## Commands
//! - Placing orders and participant actions (accept, decline, ship,
//!   complete, cancel)
//! - Initializing, verifying and settling order payments
//!
//! ## Queries
//! - Listing a user's orders

mod initialize_order_payment;
mod list_orders;
mod order_action;
mod place_order;
mod settle_order_payment;
mod verify_order_payment;

// Commands
pub use initialize_order_payment::{
    InitializeOrderPaymentCommand, InitializeOrderPaymentHandler, InitializeOrderPaymentResult,
};
pub use order_action::{OrderActionCommand, OrderActionHandler, OrderActionResult};
pub use place_order::{PlaceOrderCommand, PlaceOrderHandler, PlaceOrderResult};
pub use settle_order_payment::SettleOrderPaymentHandler;
pub use verify_order_payment::{
    VerifyOrderPaymentCommand, VerifyOrderPaymentHandler, VerifyOrderPaymentResult,
};

// Queries
pub use list_orders::{ListOrdersHandler, ListOrdersQuery};
