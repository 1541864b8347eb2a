//! Configuration for governance collaborator calls.

use std::time::Duration;

use crate::error::{GovernanceError, GovernanceResult};

/// Configuration applied to catalog and store interactions.
#[derive(Debug, Clone, Copy)]
pub struct GovernanceConfig {
    collaborator_timeout: Duration,
}

impl GovernanceConfig {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(collaborator_timeout: Duration) -> Self {
        Self {
            collaborator_timeout,
        }
    }

    /// Returns the upper bound applied to each catalog or store call.
    #[must_use]
    pub const fn collaborator_timeout(self) -> Duration {
        self.collaborator_timeout
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::InvalidConfiguration`] when the timeout is
    /// zero.
    pub fn validate(self) -> GovernanceResult<()> {
        if self.collaborator_timeout.is_zero() {
            return Err(GovernanceError::invalid_configuration(
                "collaborator timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout: Duration::from_secs(5),
        }
    }
}
