//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers write through repositories or the settlement store;
//! query handlers only read.

pub mod handlers;
pub mod notifications;

pub use notifications::NotificationDispatcher;
