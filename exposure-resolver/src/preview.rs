//! Resolved exposure previews.

use exposure_catalog::Tool;
use serde::{Deserialize, Serialize};

/// The concrete exposure a role's permission set resolves to.
///
/// Tools are deduplicated by id and listed in catalog order. Each tool
/// carries its `bundle_name`, which is the bundle that contributed it, so
/// display layers can group the listing without further lookups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExposurePreview {
    role_name: String,
    total_exposed_tools: usize,
    exposed_bundles: Vec<String>,
    exposed_tools: Vec<Tool>,
}

impl ExposurePreview {
    /// Assembles a preview; the total is fixed to the tool list length.
    #[must_use]
    pub fn new(
        role_name: impl Into<String>,
        exposed_bundles: Vec<String>,
        exposed_tools: Vec<Tool>,
    ) -> Self {
        Self {
            role_name: role_name.into(),
            total_exposed_tools: exposed_tools.len(),
            exposed_bundles,
            exposed_tools,
        }
    }

    /// Returns the empty preview for a role.
    #[must_use]
    pub fn empty(role_name: impl Into<String>) -> Self {
        Self::new(role_name, Vec::new(), Vec::new())
    }

    /// Returns the role this preview was resolved for.
    #[must_use]
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    /// Returns the number of distinct exposed tools.
    #[must_use]
    pub const fn total_exposed_tools(&self) -> usize {
        self.total_exposed_tools
    }

    /// Returns the exposed bundle names in catalog order.
    #[must_use]
    pub fn exposed_bundles(&self) -> &[String] {
        &self.exposed_bundles
    }

    /// Returns the exposed tools in catalog order.
    #[must_use]
    pub fn exposed_tools(&self) -> &[Tool] {
        &self.exposed_tools
    }

    /// Returns whether the named tool is exposed.
    #[must_use]
    pub fn contains_tool(&self, name: &str) -> bool {
        self.exposed_tools.iter().any(|tool| tool.name() == name)
    }

    /// Returns whether nothing is exposed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exposed_tools.is_empty() && self.exposed_bundles.is_empty()
    }
}
