//! Core shared types for the tool exposure engine.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod permission;
mod role;

/// Error type and result alias shared across the engine primitives.
pub use error::{Error, Result};
/// Exposure permission grammar and display projections.
pub use permission::{Permission, PermissionDescription, PermissionKind};
/// Validated role identity.
pub use role::RoleName;
