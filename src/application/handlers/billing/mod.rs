//! Billing handlers.
//!
//! ## Commands
//! - Creating and cancelling subscriptions
//! - Initializing, verifying and settling subscription payments
//! - Expiring lapsed subscriptions
//!
//! ## Queries
//! - Plan catalogue
//! - A user's current subscription
//! - One subscription by id

mod cancel_subscription;
mod create_subscription;
mod expire_lapsed_subscriptions;
mod get_current_subscription;
mod get_subscription;
mod initialize_subscription_payment;
mod list_plans;
mod settle_subscription_payment;
mod verify_subscription_payment;

// Commands
pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use expire_lapsed_subscriptions::{
    ExpireLapsedSubscriptionsCommand, ExpireLapsedSubscriptionsHandler,
    ExpireLapsedSubscriptionsResult,
};
pub use initialize_subscription_payment::{
    InitializeSubscriptionPaymentCommand, InitializeSubscriptionPaymentHandler,
    InitializeSubscriptionPaymentResult,
};
pub use settle_subscription_payment::SettleSubscriptionPaymentHandler;
pub use verify_subscription_payment::{
    VerifySubscriptionPaymentCommand, VerifySubscriptionPaymentHandler,
    VerifySubscriptionPaymentResult,
};

// Queries
pub use get_current_subscription::{
    CurrentSubscription, GetCurrentSubscriptionHandler, GetCurrentSubscriptionQuery,
};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery};
pub use list_plans::{ListPlansHandler, ListPlansQuery};
