//! Farm Ledger - payment and ledger reconciliation for a farm marketplace
//!
//! Buyers pay for crop orders and users pay for plan subscriptions through a
//! hosted payment gateway. This crate settles those payments exactly once,
//! whether confirmation arrives by signed webhook or client-side
//! verification, and credits farmer wallets through an append-only ledger.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
