//! Catalog data model: tools and the bundles that group them.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::view::{CatalogError, CatalogResult};

const MAX_TOOL_NAME_LEN: usize = 64;
const MAX_BUNDLE_NAME_LEN: usize = 96;

/// Unique identifier for a catalog tool.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(Uuid);

impl ToolId {
    /// Generates a random tool identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for ToolId {
    fn default() -> Self {
        Self::random()
    }
}

impl Display for ToolId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for ToolId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<ToolId> for Uuid {
    fn from(value: ToolId) -> Self {
        value.0
    }
}

impl FromStr for ToolId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s).map_err(CatalogError::from)?;
        Ok(Self::from_uuid(uuid))
    }
}

/// A callable unit listed in the catalog and exposed to role members.
///
/// `name` is the unique snake_case identifier that permission strings refer
/// to; `bundle_name` names the single bundle the tool belongs to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    id: ToolId,
    name: String,
    display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    bundle_name: String,
}

impl Tool {
    /// Creates a tool with a fresh random id and the display name defaulted
    /// to the tool name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidTool`] if the name is not a non-empty
    /// snake_case identifier, or [`CatalogError::InvalidBundle`] if the
    /// bundle name is empty or too long.
    pub fn new(name: impl Into<String>, bundle_name: impl Into<String>) -> CatalogResult<Self> {
        let name = name.into();
        validate_tool_name(&name)?;

        let bundle_name = bundle_name.into();
        validate_bundle_name(&bundle_name)?;

        Ok(Self {
            id: ToolId::random(),
            display_name: name.clone(),
            name,
            description: None,
            category: None,
            bundle_name,
        })
    }

    /// Overrides the generated identifier with a stable one.
    #[must_use]
    pub fn with_id(mut self, id: ToolId) -> Self {
        self.id = id;
        self
    }

    /// Sets the human-readable display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the description shown in admin surfaces.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns the stable tool identifier.
    #[must_use]
    pub const fn id(&self) -> ToolId {
        self.id
    }

    /// Returns the unique tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional category label.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the name of the bundle this tool belongs to.
    #[must_use]
    pub fn bundle_name(&self) -> &str {
        &self.bundle_name
    }
}

/// Named grouping of tools granted together by a bundle permission.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    tool_count: usize,
    tools: Vec<Tool>,
}

impl Bundle {
    /// Starts building a bundle with the given unique name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> BundleBuilder {
        BundleBuilder {
            name: name.into(),
            description: None,
            tools: Vec::new(),
        }
    }

    /// Returns the unique bundle name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the number of member tools.
    #[must_use]
    pub const fn tool_count(&self) -> usize {
        self.tool_count
    }

    /// Returns the member tools in stable catalog order.
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }
}

/// Builder for [`Bundle`].
#[derive(Debug)]
pub struct BundleBuilder {
    name: String,
    description: Option<String>,
    tools: Vec<Tool>,
}

impl BundleBuilder {
    /// Sets an optional description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a member tool.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ForeignTool`] when the tool names a different
    /// bundle, or [`CatalogError::DuplicateTool`] when the tool name is
    /// already present in this bundle.
    pub fn add_tool(mut self, tool: Tool) -> CatalogResult<Self> {
        if tool.bundle_name() != self.name {
            return Err(CatalogError::ForeignTool {
                tool: tool.name().to_owned(),
                bundle: tool.bundle_name().to_owned(),
                expected: self.name.clone(),
            });
        }
        if self.tools.iter().any(|existing| existing.name() == tool.name()) {
            return Err(CatalogError::DuplicateTool {
                name: tool.name().to_owned(),
            });
        }
        self.tools.push(tool);
        Ok(self)
    }

    /// Finalises the bundle, fixing `tool_count` to the member count.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBundle`] if the bundle name is empty
    /// or too long.
    pub fn build(self) -> CatalogResult<Bundle> {
        validate_bundle_name(&self.name)?;

        Ok(Bundle {
            name: self.name,
            description: self.description,
            tool_count: self.tools.len(),
            tools: self.tools,
        })
    }
}

fn validate_tool_name(name: &str) -> CatalogResult<()> {
    if name.is_empty() {
        return Err(CatalogError::InvalidTool {
            reason: "tool name cannot be empty".into(),
        });
    }
    if name.len() > MAX_TOOL_NAME_LEN {
        return Err(CatalogError::InvalidTool {
            reason: format!("tool name length must be <= {MAX_TOOL_NAME_LEN}"),
        });
    }
    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_'))
    {
        return Err(CatalogError::InvalidTool {
            reason: "tool name must be snake_case: lowercase alphanumeric or underscore".into(),
        });
    }
    Ok(())
}

fn validate_bundle_name(name: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::InvalidBundle {
            reason: "bundle name cannot be empty".into(),
        });
    }
    if name.len() > MAX_BUNDLE_NAME_LEN {
        return Err(CatalogError::InvalidBundle {
            reason: format!("bundle name length must be <= {MAX_BUNDLE_NAME_LEN}"),
        });
    }
    Ok(())
}
