//! Versioned permission sets held per role.

use std::collections::BTreeSet;

use exposure_primitives::Permission;
use serde::{Deserialize, Serialize};

/// The permission set stored for one role, tagged with its CAS version.
///
/// Version 0 with an empty set is the implicit state of every role that has
/// never been granted anything; each committed mutation bumps the version
/// by exactly one.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoleGrants {
    permissions: BTreeSet<Permission>,
    version: u64,
}

impl RoleGrants {
    /// Returns the empty version-0 grant set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a grant set at an explicit version.
    #[must_use]
    pub fn new(permissions: BTreeSet<Permission>, version: u64) -> Self {
        Self {
            permissions,
            version,
        }
    }

    /// Returns the granted permissions in canonical order.
    #[must_use]
    pub const fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Returns the CAS version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns whether the exact permission is held.
    #[must_use]
    pub fn contains(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns the number of granted permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns whether no permissions are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Consumes the grants, returning the permission set.
    #[must_use]
    pub fn into_permissions(self) -> BTreeSet<Permission> {
        self.permissions
    }
}
