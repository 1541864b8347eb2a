//! Shared error definitions for the exposure grammar.

use thiserror::Error;

/// Result alias used throughout the exposure primitives.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling permission and role values.
#[derive(Debug, Error)]
pub enum Error {
    /// A permission string did not match the exposure grammar.
    #[error("malformed permission `{input}`: {reason}")]
    MalformedPermission {
        /// The string that failed to parse.
        input: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Role name failed validation.
    #[error("invalid role name `{name}`: {reason}")]
    InvalidRole {
        /// The offending role name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}
