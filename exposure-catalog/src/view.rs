//! Read-only port over the tool catalog.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Error as UuidError;

use crate::model::{Bundle, Tool};

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors produced by catalog construction and catalog access.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Tool definition failed validation.
    #[error("invalid tool: {reason}")]
    InvalidTool {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Bundle definition failed validation.
    #[error("invalid bundle: {reason}")]
    InvalidBundle {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool identifier could not be parsed.
    #[error("invalid tool id: {source}")]
    InvalidToolId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Tool name collided with an existing tool.
    #[error("tool `{name}` is already present in the catalog")]
    DuplicateTool {
        /// Name of the offending tool.
        name: String,
    },

    /// Bundle name collided with an existing bundle.
    #[error("bundle `{name}` is already present in the catalog")]
    DuplicateBundle {
        /// Name of the offending bundle.
        name: String,
    },

    /// A tool was attached to a bundle it does not belong to.
    #[error("tool `{tool}` belongs to bundle `{bundle}`, not `{expected}`")]
    ForeignTool {
        /// Name of the misplaced tool.
        tool: String,
        /// Bundle the tool claims as its own.
        bundle: String,
        /// Bundle the tool was attached to.
        expected: String,
    },

    /// The catalog backend could not be reached.
    #[error("catalog unavailable: {reason}")]
    Unavailable {
        /// Human-readable context provided by the backend.
        reason: String,
    },
}

impl CatalogError {
    /// Convenience helper to construct backend unavailability errors.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Trait implemented by catalog backends serving exposure resolution.
///
/// `Ok(None)` from the lookup methods means the name is absent; `Err` means
/// the backend itself failed and callers must fail closed.
#[async_trait]
pub trait CatalogView: Send + Sync {
    /// Lists every bundle with its member tools, in stable catalog order.
    ///
    /// The listing is finite and snapshot-consistent within one call;
    /// callers restart it by calling again.
    async fn bundles(&self) -> CatalogResult<Vec<Bundle>>;

    /// Looks up a tool by its unique name.
    async fn tool_by_name(&self, name: &str) -> CatalogResult<Option<Tool>>;

    /// Looks up a bundle by its unique name.
    async fn bundle_by_name(&self, name: &str) -> CatalogResult<Option<Bundle>>;

    /// Counts the tools across all bundles.
    async fn total_tool_count(&self) -> CatalogResult<usize> {
        Ok(self.bundles().await?.iter().map(Bundle::tool_count).sum())
    }
}
