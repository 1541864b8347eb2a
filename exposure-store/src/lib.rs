//! Versioned storage for role permission sets.

#![warn(missing_docs, clippy::pedantic)]

mod gateway;
mod grants;
mod ledger;
mod memory;

/// Storage port and its error types.
pub use gateway::{GrantStore, StoreError, StoreResult};
/// Versioned permission sets.
pub use grants::RoleGrants;
/// Durable append-only implementation.
pub use ledger::GrantLedger;
/// In-memory implementation and its counters.
pub use memory::{MemoryGrantStore, StoreStats};
