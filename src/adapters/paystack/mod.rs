//! Paystack payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Paystack REST API:
//! - `POST /transaction/initialize` opens a hosted checkout
//! - `GET /transaction/verify/{reference}` reports a payment's status
//!
//! # Security
//!
//! The secret key is held as `secrecy::SecretString` and only exposed to
//! build the `Authorization` header. Webhook signatures are checked by
//! [`WebhookSignatureVerifier`](crate::domain::payment::WebhookSignatureVerifier)
//! with the same key.

mod client;
mod mock_gateway;
mod wire;

pub use client::{PaystackConfig, PaystackGateway};
pub use mock_gateway::{MockPaymentGateway, RecordedCall};
