//! Governed administration of role tool exposure.
//!
//! This crate ties the permission grammar, catalog, store, and resolver
//! together behind [`ExposureService`]: previews answer what a role can
//! currently see, mutations change what it is granted, and every committed
//! change produces an audit event.

#![warn(missing_docs, clippy::pedantic)]

mod audit;
mod config;
mod error;
mod mutator;

use std::fmt;
use std::sync::Arc;

use exposure_catalog::CatalogView;
use exposure_primitives::RoleName;
use exposure_resolver::{ExposurePreview, ExposureResolver, ResolveError};
use exposure_store::GrantStore;

use mutator::{CATALOG, bounded, fetch_grants};

pub use audit::{
    AuditError, AuditResult, AuditSink, MutationAction, MutationEvent, TracingAuditSink,
};
pub use config::GovernanceConfig;
pub use error::{GovernanceError, GovernanceResult};
pub use mutator::{MutationOutcome, PermissionMutator};

fn map_resolve_error(err: ResolveError) -> GovernanceError {
    let ResolveError::Catalog { source } = err;
    GovernanceError::unavailable(CATALOG, source.to_string())
}

/// Facade combining exposure resolution with governed grant mutation.
pub struct ExposureService {
    resolver: ExposureResolver,
    mutator: PermissionMutator,
    store: Arc<dyn GrantStore>,
    config: GovernanceConfig,
}

impl fmt::Debug for ExposureService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposureService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExposureService {
    /// Starts building a service.
    #[must_use]
    pub fn builder() -> ExposureServiceBuilder {
        ExposureServiceBuilder::new()
    }

    /// Returns the configuration the service was built with.
    #[must_use]
    pub const fn config(&self) -> GovernanceConfig {
        self.config
    }

    /// Computes the effective tool exposure for a role.
    ///
    /// Unknown roles resolve to an empty preview rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::CollaboratorUnavailable`] when the store or
    /// catalog fails or exceeds the configured deadline; no partial previews
    /// are served.
    pub async fn exposure_preview(&self, role: &RoleName) -> GovernanceResult<ExposurePreview> {
        let limit = self.config.collaborator_timeout();
        let grants = fetch_grants(self.store.as_ref(), limit, role).await?;
        bounded(
            limit,
            CATALOG,
            self.resolver.resolve(role, grants.permissions()),
        )
        .await?
        .map_err(map_resolve_error)
    }

    /// Reports whether one tool is currently exposed to the role.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::CollaboratorUnavailable`] when the store or
    /// catalog fails or exceeds the configured deadline.
    pub async fn is_tool_exposed(
        &self,
        role: &RoleName,
        tool_name: &str,
    ) -> GovernanceResult<bool> {
        let preview = self.exposure_preview(role).await?;
        Ok(preview.contains_tool(tool_name))
    }

    /// Grants a permission to the role.
    ///
    /// # Errors
    ///
    /// See [`PermissionMutator::add`].
    pub async fn add_permission(
        &self,
        role: &RoleName,
        permission: &str,
    ) -> GovernanceResult<MutationOutcome> {
        self.mutator.add(role, permission).await
    }

    /// Revokes an exact permission from the role.
    ///
    /// # Errors
    ///
    /// See [`PermissionMutator::remove`].
    pub async fn remove_permission(
        &self,
        role: &RoleName,
        permission: &str,
    ) -> GovernanceResult<MutationOutcome> {
        self.mutator.remove(role, permission).await
    }

    /// Lists the role's direct grants in canonical string form.
    ///
    /// `expose:all` sorts first; remaining grants follow in lexicographic
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::CollaboratorUnavailable`] when the store
    /// fails or exceeds the configured deadline.
    pub async fn list_permissions(&self, role: &RoleName) -> GovernanceResult<Vec<String>> {
        let limit = self.config.collaborator_timeout();
        let grants = fetch_grants(self.store.as_ref(), limit, role).await?;
        Ok(grants
            .permissions()
            .iter()
            .map(ToString::to_string)
            .collect())
    }
}

/// Builder assembling an [`ExposureService`] from its collaborators.
#[derive(Default)]
pub struct ExposureServiceBuilder {
    catalog: Option<Arc<dyn CatalogView>>,
    store: Option<Arc<dyn GrantStore>>,
    audit: Option<Arc<dyn AuditSink>>,
    config: GovernanceConfig,
}

impl fmt::Debug for ExposureServiceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposureServiceBuilder")
            .field("catalog_configured", &self.catalog.is_some())
            .field("store_configured", &self.store.is_some())
            .field("audit_configured", &self.audit.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl ExposureServiceBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the catalog consulted for validation and resolution.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogView>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the store holding per-role grants.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn GrantStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the default [`TracingAuditSink`].
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Overrides the default configuration.
    #[must_use]
    pub fn with_config(mut self, config: GovernanceConfig) -> Self {
        self.config = config;
        self
    }

    /// Finalises the service.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::InvalidConfiguration`] when the catalog or
    /// store is missing, or when the configuration fails validation.
    pub fn build(self) -> GovernanceResult<ExposureService> {
        let catalog = self
            .catalog
            .ok_or_else(|| GovernanceError::invalid_configuration("a catalog view is required"))?;
        let store = self
            .store
            .ok_or_else(|| GovernanceError::invalid_configuration("a grant store is required"))?;
        self.config.validate()?;

        let audit = self.audit.unwrap_or_else(|| Arc::new(TracingAuditSink));

        let resolver = ExposureResolver::new(Arc::clone(&catalog));
        let mutator = PermissionMutator::new(catalog, Arc::clone(&store), audit, self.config);

        Ok(ExposureService {
            resolver,
            mutator,
            store,
            config: self.config,
        })
    }
}
