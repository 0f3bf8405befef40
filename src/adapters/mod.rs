//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory store for every repository and settlement port
//! - `postgres` - PostgreSQL repositories and the locked settlement store
//! - `paystack` - Payment gateway client plus a scriptable mock
//! - `notify` - Notifier implementations
//! - `http` - axum REST API

pub mod http;
pub mod memory;
pub mod notify;
pub mod paystack;
pub mod postgres;

pub use memory::InMemoryMarketplaceStore;
pub use notify::{RecordingNotifier, TracingNotifier};
pub use paystack::{MockPaymentGateway, PaystackConfig, PaystackGateway};
