//! Audit trail emitted for committed grant mutations.

use std::fmt::{self, Display, Formatter};
use std::time::SystemTime;

use exposure_primitives::{Permission, RoleName};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Result alias for audit sink operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Errors surfaced by audit sinks.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink could not persist or forward the event.
    #[error("audit sink failed: {reason}")]
    Sink {
        /// Human-readable context provided by the sink.
        reason: String,
    },
}

impl AuditError {
    /// Convenience helper to construct sink failures.
    #[must_use]
    pub fn sink(reason: impl Into<String>) -> Self {
        Self::Sink {
            reason: reason.into(),
        }
    }
}

/// Direction of a committed grant mutation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    /// A permission was added to the role's grants.
    Add,
    /// A permission was removed from the role's grants.
    Remove,
}

impl MutationAction {
    /// Stable lowercase label used in logs and serialized events.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

impl Display for MutationAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Record of a single committed mutation.
///
/// Events are produced only after the store commit succeeds; a delivery
/// failure never rolls the commit back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MutationEvent {
    event_id: Uuid,
    occurred_at: SystemTime,
    role: RoleName,
    action: MutationAction,
    permission: Permission,
    resulting_version: u64,
}

impl MutationEvent {
    /// Creates an event with a fresh identifier stamped at the current time.
    #[must_use]
    pub fn new(
        role: RoleName,
        action: MutationAction,
        permission: Permission,
        resulting_version: u64,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: SystemTime::now(),
            role,
            action,
            permission,
            resulting_version,
        }
    }

    /// Returns the unique event identifier.
    #[must_use]
    pub const fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Returns when the mutation was committed.
    #[must_use]
    pub const fn occurred_at(&self) -> SystemTime {
        self.occurred_at
    }

    /// Returns the role whose grants changed.
    #[must_use]
    pub const fn role(&self) -> &RoleName {
        &self.role
    }

    /// Returns the direction of the change.
    #[must_use]
    pub const fn action(&self) -> MutationAction {
        self.action
    }

    /// Returns the permission that was added or removed.
    #[must_use]
    pub const fn permission(&self) -> &Permission {
        &self.permission
    }

    /// Returns the grant version produced by the commit.
    #[must_use]
    pub const fn resulting_version(&self) -> u64 {
        self.resulting_version
    }
}

/// Destination for committed mutation events.
pub trait AuditSink: Send + Sync {
    /// Delivers one mutation event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when delivery fails; the mutation that produced
    /// the event stays committed regardless.
    fn emit(&self, event: &MutationEvent) -> AuditResult<()>;
}

/// Audit sink that logs mutation events through tracing.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: &MutationEvent) -> AuditResult<()> {
        info!(
            event_id = %event.event_id(),
            role = %event.role(),
            action = event.action().label(),
            permission = %event.permission(),
            resulting_version = event.resulting_version(),
            "grant mutation audited"
        );
        Ok(())
    }
}
