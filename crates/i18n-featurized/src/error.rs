//! Error taxonomy for coverage queries.
//!
//! Configuration absence is *not* an error: an unset feature or language
//! source degrades to empty result sets. Errors are reserved for malformed
//! feature identifiers and for failures of the underlying catalog store,
//! which propagate unchanged (no retry, no swallowing).

use thiserror::Error;

/// Errors from feature coverage queries.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// A feature identifier is unusable under the configured tagging
    /// strategy (empty, non-word characters for the inline marker, or an
    /// embedded path separator for the hierarchical prefix).
    #[error("invalid feature id {0:?} for the configured tagging strategy")]
    InvalidFeature(String),
    /// A key matcher could not be compiled from the active feature set.
    #[error("failed to compile feature matcher: {0}")]
    Matcher(String),
    /// The underlying catalog store failed during a lookup or key scan.
    #[error("catalog store error: {0}")]
    Store(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoverageError>;
