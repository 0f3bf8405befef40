//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Gateway
//!
//! - `PaymentGateway` - Hosted checkout and payment status lookup
//!
//! ## Persistence
//!
//! - `PlanRepository`, `SubscriptionRepository`, `BillingTransactionRepository`
//! - `CropRepository`, `OrderRepository`, `OrderTransactionRepository`
//! - `LedgerReader` - Read side of wallets and ledger entries
//! - `SettlementStore` - The only writer of paid orders, active
//!   subscriptions, stock decrements, wallet balances and ledger entries
//!
//! ## Side effects
//!
//! - `Notifier` - Best-effort participant messages

mod billing_transaction_repository;
mod crop_repository;
mod ledger_reader;
mod notifier;
mod order_repository;
mod order_transaction_repository;
mod payment_gateway;
mod plan_repository;
mod settlement_store;
mod subscription_repository;

pub use billing_transaction_repository::BillingTransactionRepository;
pub use crop_repository::CropRepository;
pub use ledger_reader::LedgerReader;
pub use notifier::{Notification, Notifier};
pub use order_repository::OrderRepository;
pub use order_transaction_repository::OrderTransactionRepository;
pub use payment_gateway::{GatewayVerification, InitializePaymentRequest, PaymentGateway, PaymentSession};
pub use plan_repository::PlanRepository;
pub use settlement_store::{SettlementRequest, SettlementStore};
pub use subscription_repository::SubscriptionRepository;
