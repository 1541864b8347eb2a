//! Resolution of permission sets against the catalog.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use exposure_catalog::{CatalogError, CatalogView, ToolId};
use exposure_primitives::{Permission, RoleName};
use thiserror::Error;
use tracing::debug;

use crate::preview::ExposurePreview;

/// Result alias for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors surfaced during resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The catalog could not be consulted; no partial previews are served.
    #[error("catalog unavailable during resolution: {source}")]
    Catalog {
        /// Source catalog failure.
        #[from]
        source: CatalogError,
    },
}

/// Resolves permission sets into concrete exposure previews.
///
/// Resolution is read-only and recomputed on every call; previews are never
/// cached across catalog changes.
pub struct ExposureResolver {
    catalog: Arc<dyn CatalogView>,
}

impl fmt::Debug for ExposureResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposureResolver").finish_non_exhaustive()
    }
}

impl ExposureResolver {
    /// Creates a resolver over the supplied catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogView>) -> Self {
        Self { catalog }
    }

    /// Resolves the permission set of `role` into an exposure preview.
    ///
    /// Grant-time validation is strict but resolution is lenient: grants
    /// that no longer match anything in the catalog are skipped and logged
    /// at debug level, so catalog drift never breaks reads. Output order is
    /// catalog order for bundles and tools alike.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Catalog`] when the catalog cannot be listed;
    /// partial previews are never produced.
    pub async fn resolve(
        &self,
        role: &RoleName,
        permissions: &BTreeSet<Permission>,
    ) -> ResolveResult<ExposurePreview> {
        if permissions.is_empty() {
            return Ok(ExposurePreview::empty(role.as_str()));
        }

        if permissions.contains(&Permission::All) {
            return self.resolve_full_access(role).await;
        }

        let mut granted_bundles: HashSet<&str> = HashSet::new();
        let mut granted_tools: HashSet<&str> = HashSet::new();
        for permission in permissions {
            match permission {
                Permission::All => {}
                Permission::Bundle(name) => {
                    granted_bundles.insert(name.as_str());
                }
                Permission::Tool(name) => {
                    granted_tools.insert(name.as_str());
                }
            }
        }

        let mut stale_bundles = granted_bundles.clone();
        let mut stale_tools = granted_tools.clone();

        let bundles = self.catalog.bundles().await?;
        let mut exposed_bundles = Vec::new();
        let mut exposed_tools = Vec::new();
        let mut seen: HashSet<ToolId> = HashSet::new();

        for bundle in &bundles {
            let whole_bundle = granted_bundles.contains(bundle.name());
            if whole_bundle {
                stale_bundles.remove(bundle.name());
            }

            let mut contributed = whole_bundle;
            for tool in bundle.tools() {
                let direct = granted_tools.contains(tool.name());
                if direct {
                    stale_tools.remove(tool.name());
                }
                if (whole_bundle || direct) && seen.insert(tool.id()) {
                    exposed_tools.push(tool.clone());
                }
                contributed = contributed || direct;
            }

            if contributed {
                exposed_bundles.push(bundle.name().to_owned());
            }
        }

        if !stale_bundles.is_empty() || !stale_tools.is_empty() {
            debug!(
                %role,
                ?stale_bundles,
                ?stale_tools,
                "skipping grants with no catalog match"
            );
        }

        debug!(
            %role,
            bundles = exposed_bundles.len(),
            tools = exposed_tools.len(),
            "resolved exposure preview"
        );

        Ok(ExposurePreview::new(
            role.as_str(),
            exposed_bundles,
            exposed_tools,
        ))
    }

    /// Short-circuit for the full-access grant: every bundle, every tool,
    /// remaining permissions not consulted.
    async fn resolve_full_access(&self, role: &RoleName) -> ResolveResult<ExposurePreview> {
        let bundles = self.catalog.bundles().await?;
        let mut exposed_bundles = Vec::with_capacity(bundles.len());
        let mut exposed_tools = Vec::new();

        for bundle in bundles {
            exposed_bundles.push(bundle.name().to_owned());
            exposed_tools.extend_from_slice(bundle.tools());
        }

        debug!(%role, tools = exposed_tools.len(), "resolved full-access preview");

        Ok(ExposurePreview::new(
            role.as_str(),
            exposed_bundles,
            exposed_tools,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use exposure_catalog::{Bundle, BundleBuilder, CatalogResult, CatalogSnapshot, Tool};

    fn catalog() -> Arc<CatalogSnapshot> {
        let booking = Bundle::builder("Service Booking")
            .add_tool(Tool::new("book_appointment", "Service Booking").unwrap())
            .and_then(|b| b.add_tool(Tool::new("cancel_appointment", "Service Booking").unwrap()))
            .and_then(BundleBuilder::build)
            .unwrap();
        let analytics = Bundle::builder("Analytics")
            .add_tool(Tool::new("usage_report", "Analytics").unwrap())
            .and_then(BundleBuilder::build)
            .unwrap();

        Arc::new(CatalogSnapshot::new(vec![booking, analytics]).unwrap())
    }

    fn resolver() -> ExposureResolver {
        ExposureResolver::new(catalog())
    }

    fn role(name: &str) -> RoleName {
        RoleName::new(name).expect("role")
    }

    fn grants(permissions: &[Permission]) -> BTreeSet<Permission> {
        permissions.iter().cloned().collect()
    }

    struct FailingCatalog;

    #[async_trait]
    impl CatalogView for FailingCatalog {
        async fn bundles(&self) -> CatalogResult<Vec<Bundle>> {
            Err(CatalogError::unavailable("catalog offline"))
        }

        async fn tool_by_name(&self, _name: &str) -> CatalogResult<Option<Tool>> {
            Err(CatalogError::unavailable("catalog offline"))
        }

        async fn bundle_by_name(&self, _name: &str) -> CatalogResult<Option<Bundle>> {
            Err(CatalogError::unavailable("catalog offline"))
        }
    }

    #[tokio::test]
    async fn empty_permissions_resolve_to_empty_preview() {
        let resolver = ExposureResolver::new(Arc::new(FailingCatalog));
        let preview = resolver
            .resolve(&role("operator"), &BTreeSet::new())
            .await
            .unwrap();

        assert!(preview.is_empty());
        assert_eq!(preview.role_name(), "operator");
    }

    #[tokio::test]
    async fn all_grant_exposes_entire_catalog() {
        let preview = resolver()
            .resolve(&role("admin"), &grants(&[Permission::All]))
            .await
            .unwrap();

        assert_eq!(preview.total_exposed_tools(), 3);
        assert_eq!(preview.exposed_bundles(), ["Service Booking", "Analytics"]);
        let names: Vec<_> = preview.exposed_tools().iter().map(Tool::name).collect();
        assert_eq!(names, ["book_appointment", "cancel_appointment", "usage_report"]);
    }

    #[tokio::test]
    async fn bundle_grant_exposes_member_tools_and_name() {
        let preview = resolver()
            .resolve(
                &role("operator"),
                &grants(&[Permission::bundle("Service Booking")]),
            )
            .await
            .unwrap();

        assert_eq!(preview.total_exposed_tools(), 2);
        assert_eq!(preview.exposed_bundles(), ["Service Booking"]);
        assert!(preview.contains_tool("book_appointment"));
        assert!(!preview.contains_tool("usage_report"));
    }

    #[tokio::test]
    async fn tool_grant_exposes_tool_and_parent_bundle() {
        let preview = resolver()
            .resolve(
                &role("operator"),
                &grants(&[Permission::tool("usage_report")]),
            )
            .await
            .unwrap();

        assert_eq!(preview.total_exposed_tools(), 1);
        assert_eq!(preview.exposed_bundles(), ["Analytics"]);
        assert_eq!(preview.exposed_tools()[0].bundle_name(), "Analytics");
    }

    #[tokio::test]
    async fn bundle_plus_member_tool_counts_once() {
        let resolver = resolver();
        let operator = role("operator");

        let combined = resolver
            .resolve(
                &operator,
                &grants(&[
                    Permission::bundle("Service Booking"),
                    Permission::tool("book_appointment"),
                ]),
            )
            .await
            .unwrap();
        let bundle_only = resolver
            .resolve(&operator, &grants(&[Permission::bundle("Service Booking")]))
            .await
            .unwrap();

        assert_eq!(combined, bundle_only);
        assert_eq!(combined.total_exposed_tools(), 2);
    }

    #[tokio::test]
    async fn stale_grants_are_skipped_silently() {
        let preview = resolver()
            .resolve(
                &role("operator"),
                &grants(&[
                    Permission::bundle("Decommissioned"),
                    Permission::tool("retired_tool"),
                    Permission::tool("usage_report"),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(preview.total_exposed_tools(), 1);
        assert_eq!(preview.exposed_bundles(), ["Analytics"]);
    }

    #[tokio::test]
    async fn ordering_follows_catalog_not_grant_insertion() {
        let resolver = resolver();
        let operator = role("operator");
        let permissions = grants(&[
            Permission::tool("usage_report"),
            Permission::tool("cancel_appointment"),
            Permission::tool("book_appointment"),
        ]);

        let first = resolver.resolve(&operator, &permissions).await.unwrap();
        let second = resolver.resolve(&operator, &permissions).await.unwrap();

        let names: Vec<_> = first.exposed_tools().iter().map(Tool::name).collect();
        assert_eq!(names, ["book_appointment", "cancel_appointment", "usage_report"]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn catalog_failure_fails_closed() {
        let resolver = ExposureResolver::new(Arc::new(FailingCatalog));
        let err = resolver
            .resolve(&role("operator"), &grants(&[Permission::All]))
            .await
            .expect_err("should fail closed");

        assert!(matches!(err, ResolveError::Catalog { .. }));
    }
}
