//! Storage port for role permission sets.

use std::collections::BTreeSet;

use async_trait::async_trait;
use exposure_primitives::{Permission, RoleName};
use serde_json::Error as SerdeError;
use thiserror::Error;

use crate::grants::RoleGrants;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors emitted by grant store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version moved between read and write.
    #[error("version conflict for role `{role}`: expected {expected}, found {actual}")]
    VersionConflict {
        /// Role whose grants were contended.
        role: String,
        /// Version the caller observed.
        expected: u64,
        /// Version actually stored.
        actual: u64,
    },

    /// Underlying I/O failure while reading or writing ledger files.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },

    /// Serialization or deserialization error.
    #[error("serialization error: {source}")]
    Serialization {
        /// Source [`serde_json::Error`].
        #[from]
        source: SerdeError,
    },

    /// Store backend could not be reached.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Human-readable context provided by the backend.
        reason: String,
    },
}

impl StoreError {
    /// Convenience helper to construct backend unavailability errors.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Trait implemented by versioned permission store backends.
///
/// All writes go through compare-and-swap. Backends never lock on behalf of
/// callers and never retry conflicts themselves; retry policy belongs to
/// the mutation layer.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Fetches the current grants for a role.
    ///
    /// Roles come into being implicitly: an unknown role yields
    /// [`RoleGrants::empty`], never an error.
    async fn fetch(&self, role: &RoleName) -> StoreResult<RoleGrants>;

    /// Replaces the role's permission set if the stored version still
    /// equals `expected_version`, returning the new version.
    ///
    /// On a mismatch the stored state is left untouched and
    /// [`StoreError::VersionConflict`] is returned.
    async fn compare_and_swap(
        &self,
        role: &RoleName,
        expected_version: u64,
        permissions: BTreeSet<Permission>,
    ) -> StoreResult<u64>;
}
