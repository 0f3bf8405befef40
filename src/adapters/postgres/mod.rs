//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - One repository per aggregate, each holding a cloned `PgPool`
//! - `PostgresLedgerReader` - wallet and ledger queries
//! - `PostgresSettlementStore` - the locked, single-transaction settlement path
//!
//! The schema lives in `migrations/`.

mod billing_transaction_repository;
mod crop_repository;
mod ledger_reader;
mod order_repository;
mod order_transaction_repository;
mod plan_repository;
mod rows;
mod settlement_store;
mod subscription_repository;

pub use billing_transaction_repository::PostgresBillingTransactionRepository;
pub use crop_repository::PostgresCropRepository;
pub use ledger_reader::PostgresLedgerReader;
pub use order_repository::PostgresOrderRepository;
pub use order_transaction_repository::PostgresOrderTransactionRepository;
pub use plan_repository::PostgresPlanRepository;
pub use settlement_store::PostgresSettlementStore;
pub use subscription_repository::PostgresSubscriptionRepository;
