//! Durable grant store backed by an append-only file.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use exposure_primitives::{Permission, RoleName};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::gateway::{GrantStore, StoreError, StoreResult};
use crate::grants::RoleGrants;

/// One committed grant state, as written to the ledger file.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerEntry {
    role: String,
    permissions: BTreeSet<Permission>,
    version: u64,
}

struct LedgerInner {
    roles: HashMap<String, RoleGrants>,
    file: tokio::fs::File,
}

/// Grant store appending one newline-delimited JSON entry per commit.
///
/// On open the file is replayed to rebuild current state; the last entry
/// per role wins. Because writes only append, the file doubles as a change
/// history operators can inspect.
pub struct GrantLedger {
    path: PathBuf,
    inner: Mutex<LedgerInner>,
}

impl GrantLedger {
    /// Opens (or creates) a ledger file at the provided path and replays it.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors encountered while preparing the file and
    /// serialization errors from malformed ledger lines.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .await?;

        let mut roles = HashMap::new();
        let data = fs::read(&path).await?;
        for chunk in data
            .split(|byte| *byte == b'\n')
            .filter(|chunk| !chunk.is_empty())
        {
            let entry: LedgerEntry = serde_json::from_slice(chunk)?;
            roles.insert(entry.role, RoleGrants::new(entry.permissions, entry.version));
        }

        debug!(path = %path.display(), roles = roles.len(), "grant ledger replayed");

        Ok(Self {
            path,
            inner: Mutex::new(LedgerInner { roles, file }),
        })
    }

    /// Returns the underlying path of the ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl GrantStore for GrantLedger {
    async fn fetch(&self, role: &RoleName) -> StoreResult<RoleGrants> {
        let guard = self.inner.lock().await;
        Ok(guard.roles.get(role.as_str()).cloned().unwrap_or_default())
    }

    async fn compare_and_swap(
        &self,
        role: &RoleName,
        expected_version: u64,
        permissions: BTreeSet<Permission>,
    ) -> StoreResult<u64> {
        let mut guard = self.inner.lock().await;
        let actual = guard.roles.get(role.as_str()).map_or(0, RoleGrants::version);
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                role: role.to_string(),
                expected: expected_version,
                actual,
            });
        }

        let version = expected_version + 1;
        let entry = LedgerEntry {
            role: role.to_string(),
            permissions: permissions.clone(),
            version,
        };
        let line = serde_json::to_vec(&entry)?;
        guard.file.write_all(&line).await?;
        guard.file.write_u8(b'\n').await?;
        guard.file.flush().await?;

        guard
            .roles
            .insert(role.to_string(), RoleGrants::new(permissions, version));
        Ok(version)
    }
}
