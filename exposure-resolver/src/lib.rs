//! Pure resolution of role permissions into exposure previews.

#![warn(missing_docs, clippy::pedantic)]

mod preview;
mod resolve;

/// Resolved preview types.
pub use preview::ExposurePreview;
/// The resolver and its error types.
pub use resolve::{ExposureResolver, ResolveError, ResolveResult};
