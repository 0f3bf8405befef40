//! HTTP adapter for plan and subscription endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use routes::billing_routes;
