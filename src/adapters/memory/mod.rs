//! In-memory adapters.
//!
//! A single store implements every repository port plus the settlement
//! store behind one async lock. Used by the test suites and for running the
//! service locally without PostgreSQL.

mod settlement;
mod store;

pub use store::InMemoryMarketplaceStore;
