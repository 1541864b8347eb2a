//! Role-based tool exposure engine facade.
//!
//! Depend on this crate via `cargo add tool-exposure`. It bundles the engine
//! crates behind feature flags so downstream users can enable only the
//! components they need, from the bare permission grammar up to the full
//! governance service.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export the permission grammar and role identity for convenience.
pub use exposure_primitives as primitives;

/// Tool catalog model and view port (enabled by `catalog` feature).
#[cfg(feature = "catalog")]
pub use exposure_catalog as catalog;

/// Versioned grant storage (enabled by `store` feature).
#[cfg(feature = "store")]
pub use exposure_store as store;

/// Exposure resolution into previews (enabled by `resolver` feature).
#[cfg(feature = "resolver")]
pub use exposure_resolver as resolver;

/// Governed mutation, audit, and the service facade (enabled by
/// `governance` feature).
#[cfg(feature = "governance")]
pub use exposure_governance as governance;
