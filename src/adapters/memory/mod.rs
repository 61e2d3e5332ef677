//! In-memory adapters for tests and local runs without a database.

mod billing_store;

pub use billing_store::InMemoryBillingStore;
