//! Billing module - plans, subscriptions and their payment attempts.

mod billing_transaction;
mod plan;
mod settlement;
mod subscription;
mod subscription_status;

pub use billing_transaction::BillingTransaction;
pub use plan::{Plan, PlanInterval, UserType};
pub use settlement::{settle_subscription_payment, SubscriptionSettlement};
pub use subscription::Subscription;
pub use subscription_status::SubscriptionStatus;
