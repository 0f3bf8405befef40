//! Notifier adapters.
//!
//! Delivery channels (SMS, email, push) live outside this service. The
//! tracing notifier logs each message as a structured event for a log
//! shipper to forward; the recording notifier captures messages in tests.

mod recording;
mod tracing_notifier;

pub use recording::RecordingNotifier;
pub use tracing_notifier::TracingNotifier;
