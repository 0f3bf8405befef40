//! HTTP adapter for order endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use routes::order_routes;
