//! Role identity types.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAX_ROLE_LEN: usize = 64;

/// Named principal whose members receive the resolved tool exposure.
///
/// Roles exist implicitly: granting the first permission brings the role
/// into being, so no lifecycle management hangs off this type.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a role name after validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRole`] if the name is empty, longer than 64
    /// characters, or contains characters outside ASCII alphanumerics,
    /// dash, underscore, and dot.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_role(&name)?;
        Ok(Self(name))
    }

    /// Returns the role name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for RoleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoleName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

fn validate_role(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidRole {
            name: name.into(),
            reason: "role name cannot be empty".into(),
        });
    }

    if name.len() > MAX_ROLE_LEN {
        return Err(Error::InvalidRole {
            name: name.into(),
            reason: format!("role name length must be <= {MAX_ROLE_LEN}"),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(Error::InvalidRole {
            name: name.into(),
            reason: "role name must contain ASCII alphanumeric, dash, underscore, or dot".into(),
        });
    }

    Ok(())
}
