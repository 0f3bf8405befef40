//! Payment module - gateway-facing vocabulary shared by both settlement paths.
//!
//! Contains payment references, transaction and gateway statuses, webhook
//! signature verification, webhook event parsing, settlement admission,
//! and the payment error taxonomy.

mod errors;
mod idempotency;
mod reference;
mod signature;
mod status;
mod webhook;

pub use errors::PaymentError;
pub use idempotency::{admit, Admission, OutcomeKind, SettlementOutcome};
pub use reference::{PaymentReference, ReferenceKind};
pub use signature::{sign_payload, WebhookSignatureVerifier, SIGNATURE_HEADER};
pub use status::{GatewayStatus, TransactionStatus};
pub use webhook::{GatewayWebhookEvent, WebhookAction, WebhookCustomer, WebhookData};
