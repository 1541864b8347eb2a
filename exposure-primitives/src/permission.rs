//! Exposure permission grammar shared across the engine.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const ALL: &str = "expose:all";
const BUNDLE_PREFIX: &str = "expose:bundle:";
const TOOL_PREFIX: &str = "expose:tool:";
const FULL_ACCESS_TARGET: &str = "Full Access";

/// A single exposure grant held by a role.
///
/// The canonical string forms are `expose:all`, `expose:bundle:<name>`, and
/// `expose:tool:<name>`. Names may themselves contain `:`; everything after
/// the second separator is taken verbatim.
///
/// The derived ordering (all, then bundles by name, then tools by name)
/// coincides with lexicographic order of the canonical strings, so sorted
/// collections of permissions list `expose:all` first.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    /// Access to every tool in the catalog.
    All,
    /// Access to every tool inside the named bundle.
    Bundle(String),
    /// Access to one named tool.
    Tool(String),
}

impl Permission {
    /// Creates a bundle grant.
    #[must_use]
    pub fn bundle(name: impl Into<String>) -> Self {
        Self::Bundle(name.into())
    }

    /// Creates a single-tool grant.
    #[must_use]
    pub fn tool(name: impl Into<String>) -> Self {
        Self::Tool(name.into())
    }

    /// Returns the shape of this permission.
    #[must_use]
    pub const fn kind(&self) -> PermissionKind {
        match self {
            Self::All => PermissionKind::All,
            Self::Bundle(_) => PermissionKind::Bundle,
            Self::Tool(_) => PermissionKind::Tool,
        }
    }

    /// Returns the display projection used by admin surfaces.
    #[must_use]
    pub fn describe(&self) -> PermissionDescription {
        let (kind, target) = match self {
            Self::All => (PermissionKind::All, FULL_ACCESS_TARGET.to_owned()),
            Self::Bundle(name) => (PermissionKind::Bundle, name.clone()),
            Self::Tool(name) => (PermissionKind::Tool, name.clone()),
        };
        PermissionDescription { kind, target }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Bundle(name) => write!(f, "{BUNDLE_PREFIX}{name}"),
            Self::Tool(name) => write!(f, "{TOOL_PREFIX}{name}"),
        }
    }
}

impl FromStr for Permission {
    type Err = Error;

    /// Parses a canonical permission string.
    ///
    /// Parsing is total: every input maps either to a [`Permission`] or to
    /// [`Error::MalformedPermission`].
    fn from_str(s: &str) -> Result<Self> {
        if s == ALL {
            return Ok(Self::All);
        }
        if let Some(name) = s.strip_prefix(BUNDLE_PREFIX) {
            if name.is_empty() {
                return Err(Error::MalformedPermission {
                    input: s.into(),
                    reason: "bundle name cannot be empty".into(),
                });
            }
            return Ok(Self::Bundle(name.to_owned()));
        }
        if let Some(name) = s.strip_prefix(TOOL_PREFIX) {
            if name.is_empty() {
                return Err(Error::MalformedPermission {
                    input: s.into(),
                    reason: "tool name cannot be empty".into(),
                });
            }
            return Ok(Self::Tool(name.to_owned()));
        }
        Err(Error::MalformedPermission {
            input: s.into(),
            reason: "expected `expose:all`, `expose:bundle:<name>`, or `expose:tool:<name>`".into(),
        })
    }
}

impl TryFrom<String> for Permission {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.to_string()
    }
}

/// Shape discriminant for [`Permission`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    /// Full-catalog access.
    All,
    /// Whole-bundle access.
    Bundle,
    /// Single-tool access.
    Tool,
}

impl PermissionKind {
    /// Stable lowercase label for logs and display surfaces.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Bundle => "bundle",
            Self::Tool => "tool",
        }
    }
}

impl Display for PermissionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-oriented projection of a permission for admin surfaces.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PermissionDescription {
    kind: PermissionKind,
    target: String,
}

impl PermissionDescription {
    /// Returns the permission shape.
    #[must_use]
    pub const fn kind(&self) -> PermissionKind {
        self.kind
    }

    /// Returns the display target: `Full Access` for the all grant,
    /// otherwise the bundle or tool name.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}
