//! Error taxonomy for governed grant operations.

use exposure_primitives::{Error as PermissionError, Permission, RoleName};
use thiserror::Error;

/// Result alias for governance operations.
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Errors returned by grant mutation and exposure inspection.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Input string did not match the permission grammar.
    #[error(transparent)]
    MalformedPermission {
        /// Source grammar error.
        #[from]
        source: PermissionError,
    },

    /// The role already holds the exact permission.
    #[error("role `{role}` already holds `{permission}`")]
    DuplicatePermission {
        /// Role whose grants were inspected.
        role: RoleName,
        /// Permission that was requested again.
        permission: Permission,
    },

    /// The permission is already implied by a broader grant.
    #[error("`{permission}` is already covered by `{covered_by}`")]
    RedundantPermission {
        /// Permission that was requested.
        permission: Permission,
        /// Broader grant that covers it.
        covered_by: Permission,
    },

    /// Bundle name is not present in the catalog.
    #[error("bundle `{name}` does not exist in the catalog")]
    UnknownBundle {
        /// Name of the missing bundle.
        name: String,
    },

    /// Tool name is not present in the catalog.
    #[error("tool `{name}` does not exist in the catalog")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },

    /// Removal targeted a permission the role does not hold.
    #[error("role `{role}` does not hold `{permission}`")]
    PermissionNotHeld {
        /// Role whose grants were inspected.
        role: RoleName,
        /// Permission that was absent.
        permission: Permission,
    },

    /// Concurrent writers kept moving the grant version.
    #[error("grants for role `{role}` were modified concurrently; retry the operation")]
    ConcurrentModification {
        /// Role whose grants were contended.
        role: RoleName,
    },

    /// A catalog or store collaborator failed or exceeded its deadline.
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        /// Collaborator that failed.
        collaborator: String,
        /// Human-readable failure context.
        reason: String,
    },

    /// Service or configuration assembly failed validation.
    #[error("invalid governance configuration: {reason}")]
    InvalidConfiguration {
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl GovernanceError {
    /// Convenience helper to construct collaborator failures.
    #[must_use]
    pub fn unavailable(collaborator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            collaborator: collaborator.into(),
            reason: reason.into(),
        }
    }

    /// Convenience helper to construct configuration errors.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
