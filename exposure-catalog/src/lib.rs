//! Catalog data model and the read-only view port used for resolution.

#![warn(missing_docs, clippy::pedantic)]

mod model;
mod snapshot;
mod view;

/// Catalog data model: tools, bundles, and identifiers.
pub use model::{Bundle, BundleBuilder, Tool, ToolId};
/// Immutable in-memory catalog implementation.
pub use snapshot::CatalogSnapshot;
/// Read-only catalog port and its error types.
pub use view::{CatalogError, CatalogResult, CatalogView};
