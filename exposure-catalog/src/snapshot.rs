//! Immutable in-memory catalog.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::model::{Bundle, Tool};
use crate::view::{CatalogError, CatalogResult, CatalogView};

/// Catalog assembled once from a fixed bundle list and never mutated.
///
/// Lookups are index-backed and lock-free, which makes the snapshot safe to
/// share behind an `Arc` across request handlers.
#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    bundles: Vec<Bundle>,
    tools_by_name: HashMap<String, Tool>,
    bundle_positions: HashMap<String, usize>,
}

impl CatalogSnapshot {
    /// Builds a snapshot from the supplied bundles.
    ///
    /// Bundle order is preserved and becomes the canonical catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateBundle`] when two bundles share a
    /// name, or [`CatalogError::DuplicateTool`] when a tool name appears in
    /// more than one bundle.
    pub fn new(bundles: Vec<Bundle>) -> CatalogResult<Self> {
        let mut tools_by_name = HashMap::new();
        let mut bundle_positions = HashMap::new();

        for (position, bundle) in bundles.iter().enumerate() {
            if bundle_positions
                .insert(bundle.name().to_owned(), position)
                .is_some()
            {
                return Err(CatalogError::DuplicateBundle {
                    name: bundle.name().to_owned(),
                });
            }
            for tool in bundle.tools() {
                if tools_by_name
                    .insert(tool.name().to_owned(), tool.clone())
                    .is_some()
                {
                    return Err(CatalogError::DuplicateTool {
                        name: tool.name().to_owned(),
                    });
                }
            }
        }

        Ok(Self {
            bundles,
            tools_by_name,
            bundle_positions,
        })
    }

    /// Returns the number of bundles in the snapshot.
    #[must_use]
    pub fn bundle_count(&self) -> usize {
        self.bundles.len()
    }

    /// Returns the number of tools across all bundles.
    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tools_by_name.len()
    }
}

#[async_trait]
impl CatalogView for CatalogSnapshot {
    async fn bundles(&self) -> CatalogResult<Vec<Bundle>> {
        Ok(self.bundles.clone())
    }

    async fn tool_by_name(&self, name: &str) -> CatalogResult<Option<Tool>> {
        Ok(self.tools_by_name.get(name).cloned())
    }

    async fn bundle_by_name(&self, name: &str) -> CatalogResult<Option<Bundle>> {
        Ok(self
            .bundle_positions
            .get(name)
            .and_then(|&position| self.bundles.get(position))
            .cloned())
    }
}
