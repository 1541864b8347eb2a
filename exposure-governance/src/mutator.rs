//! Compare-and-swap mutation pipeline over role grants.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use exposure_catalog::{CatalogError, CatalogView};
use exposure_primitives::{Permission, RoleName};
use exposure_store::{GrantStore, RoleGrants, StoreError};
use tracing::{debug, warn};

use crate::audit::{AuditSink, MutationAction, MutationEvent};
use crate::config::GovernanceConfig;
use crate::error::{GovernanceError, GovernanceResult};

pub(crate) const CATALOG: &str = "catalog";
pub(crate) const GRANT_STORE: &str = "grant store";

/// Wraps a collaborator call with the configured deadline.
pub(crate) async fn bounded<F>(
    limit: Duration,
    collaborator: &str,
    call: F,
) -> GovernanceResult<F::Output>
where
    F: Future,
{
    tokio::time::timeout(limit, call).await.map_err(|_| {
        GovernanceError::unavailable(collaborator, "call exceeded the configured deadline")
    })
}

pub(crate) async fn fetch_grants(
    store: &dyn GrantStore,
    limit: Duration,
    role: &RoleName,
) -> GovernanceResult<RoleGrants> {
    bounded(limit, GRANT_STORE, store.fetch(role))
        .await?
        .map_err(map_store_error)
}

pub(crate) fn map_store_error(err: StoreError) -> GovernanceError {
    GovernanceError::unavailable(GRANT_STORE, err.to_string())
}

fn map_catalog_error(err: CatalogError) -> GovernanceError {
    GovernanceError::unavailable(CATALOG, err.to_string())
}

/// Successful result of a grant mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    version: u64,
    audit_warning: Option<String>,
}

impl MutationOutcome {
    /// Returns the grant version produced by the commit.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the audit delivery failure, when the event could not be
    /// emitted.
    #[must_use]
    pub fn audit_warning(&self) -> Option<&str> {
        self.audit_warning.as_deref()
    }
}

/// Applies validated, versioned mutations to role grant sets.
///
/// Every write follows the same pipeline: parse the raw permission, fetch
/// the current grants, validate the request against grants and catalog, and
/// commit with a compare-and-swap on the grant version. A single retry
/// re-runs the whole validation after a version conflict before the
/// operation gives up.
pub struct PermissionMutator {
    catalog: Arc<dyn CatalogView>,
    store: Arc<dyn GrantStore>,
    audit: Arc<dyn AuditSink>,
    config: GovernanceConfig,
}

impl fmt::Debug for PermissionMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionMutator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PermissionMutator {
    /// Creates a mutator over the supplied collaborators.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogView>,
        store: Arc<dyn GrantStore>,
        audit: Arc<dyn AuditSink>,
        config: GovernanceConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            audit,
            config,
        }
    }

    /// Grants a permission to the role.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError`] when the input is malformed, the grant is
    /// duplicate or redundant, the catalog does not know the target, a
    /// collaborator fails, or concurrent writers exhaust the retry.
    pub async fn add(
        &self,
        role: &RoleName,
        permission: &str,
    ) -> GovernanceResult<MutationOutcome> {
        let permission: Permission = permission.parse()?;
        self.apply(role, &permission, MutationAction::Add).await
    }

    /// Revokes an exact permission from the role.
    ///
    /// Only direct grants can be removed; tools exposed through a bundle are
    /// not held directly and removing them reports
    /// [`GovernanceError::PermissionNotHeld`].
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError`] when the input is malformed, the role does
    /// not hold the exact permission, a collaborator fails, or concurrent
    /// writers exhaust the retry.
    pub async fn remove(
        &self,
        role: &RoleName,
        permission: &str,
    ) -> GovernanceResult<MutationOutcome> {
        let permission: Permission = permission.parse()?;
        self.apply(role, &permission, MutationAction::Remove).await
    }

    async fn apply(
        &self,
        role: &RoleName,
        permission: &Permission,
        action: MutationAction,
    ) -> GovernanceResult<MutationOutcome> {
        let limit = self.config.collaborator_timeout();
        let mut retried = false;
        loop {
            let grants = fetch_grants(self.store.as_ref(), limit, role).await?;
            let next = match action {
                MutationAction::Add => self.validate_add(role, &grants, permission).await?,
                MutationAction::Remove => validate_remove(role, &grants, permission)?,
            };

            let commit = bounded(
                limit,
                GRANT_STORE,
                self.store.compare_and_swap(role, grants.version(), next),
            )
            .await?;

            match commit {
                Ok(version) => return Ok(self.finish(role, permission, action, version)),
                Err(StoreError::VersionConflict { .. }) if !retried => {
                    retried = true;
                    debug!(%role, action = action.label(), "grant version moved, revalidating");
                }
                Err(StoreError::VersionConflict { .. }) => {
                    return Err(GovernanceError::ConcurrentModification { role: role.clone() });
                }
                Err(err) => return Err(map_store_error(err)),
            }
        }
    }

    fn finish(
        &self,
        role: &RoleName,
        permission: &Permission,
        action: MutationAction,
        version: u64,
    ) -> MutationOutcome {
        debug!(
            %role,
            action = action.label(),
            %permission,
            version,
            "grant mutation committed"
        );

        let event = MutationEvent::new(role.clone(), action, permission.clone(), version);
        let audit_warning = match self.audit.emit(&event) {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    %role,
                    action = action.label(),
                    %err,
                    "audit emission failed after commit"
                );
                Some(err.to_string())
            }
        };

        MutationOutcome {
            version,
            audit_warning,
        }
    }

    async fn validate_add(
        &self,
        role: &RoleName,
        grants: &RoleGrants,
        permission: &Permission,
    ) -> GovernanceResult<BTreeSet<Permission>> {
        if grants.contains(permission) {
            return Err(GovernanceError::DuplicatePermission {
                role: role.clone(),
                permission: permission.clone(),
            });
        }
        if grants.contains(&Permission::All) {
            return Err(GovernanceError::RedundantPermission {
                permission: permission.clone(),
                covered_by: Permission::All,
            });
        }

        let limit = self.config.collaborator_timeout();
        match permission {
            Permission::All => {}
            Permission::Bundle(name) => {
                let bundle = bounded(limit, CATALOG, self.catalog.bundle_by_name(name))
                    .await?
                    .map_err(map_catalog_error)?;
                if bundle.is_none() {
                    return Err(GovernanceError::UnknownBundle { name: name.clone() });
                }
            }
            Permission::Tool(name) => {
                let tool = bounded(limit, CATALOG, self.catalog.tool_by_name(name))
                    .await?
                    .map_err(map_catalog_error)?
                    .ok_or_else(|| GovernanceError::UnknownTool { name: name.clone() })?;

                let covering = Permission::bundle(tool.bundle_name());
                if grants.contains(&covering) {
                    return Err(GovernanceError::RedundantPermission {
                        permission: permission.clone(),
                        covered_by: covering,
                    });
                }
            }
        }

        let mut next = grants.permissions().clone();
        next.insert(permission.clone());
        Ok(next)
    }
}

fn validate_remove(
    role: &RoleName,
    grants: &RoleGrants,
    permission: &Permission,
) -> GovernanceResult<BTreeSet<Permission>> {
    if !grants.contains(permission) {
        return Err(GovernanceError::PermissionNotHeld {
            role: role.clone(),
            permission: permission.clone(),
        });
    }

    let mut next = grants.permissions().clone();
    next.remove(permission);
    Ok(next)
}
