//! In-memory grant store.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use exposure_primitives::{Permission, RoleName};
use tokio::sync::RwLock;
use tracing::debug;

use crate::gateway::{GrantStore, StoreError, StoreResult};
use crate::grants::RoleGrants;

/// Counters describing write activity against a store.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StoreStats {
    /// Successful compare-and-swap commits.
    pub commits: u64,
    /// Commits rejected because the version moved.
    pub conflicts: u64,
}

#[derive(Debug, Default)]
struct MemoryInner {
    roles: HashMap<String, RoleGrants>,
    stats: StoreStats,
}

/// Grant store keeping all role state in process memory.
///
/// Suitable for tests and single-process deployments; state does not
/// survive a restart.
#[derive(Debug, Default)]
pub struct MemoryGrantStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryGrantStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns commit and conflict counters.
    pub async fn stats(&self) -> StoreStats {
        self.inner.read().await.stats
    }
}

#[async_trait]
impl GrantStore for MemoryGrantStore {
    async fn fetch(&self, role: &RoleName) -> StoreResult<RoleGrants> {
        let guard = self.inner.read().await;
        Ok(guard.roles.get(role.as_str()).cloned().unwrap_or_default())
    }

    async fn compare_and_swap(
        &self,
        role: &RoleName,
        expected_version: u64,
        permissions: BTreeSet<Permission>,
    ) -> StoreResult<u64> {
        let mut guard = self.inner.write().await;
        let actual = guard.roles.get(role.as_str()).map_or(0, RoleGrants::version);
        if actual != expected_version {
            guard.stats.conflicts += 1;
            debug!(%role, expected = expected_version, actual, "grant store version conflict");
            return Err(StoreError::VersionConflict {
                role: role.to_string(),
                expected: expected_version,
                actual,
            });
        }

        let version = expected_version + 1;
        guard
            .roles
            .insert(role.to_string(), RoleGrants::new(permissions, version));
        guard.stats.commits += 1;
        Ok(version)
    }
}
