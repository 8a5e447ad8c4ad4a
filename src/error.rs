//! Error types for compat data traversal
//!
//! Two layers: `SourceError` is raised by a support-data source, `CompatError`
//! is what the traversal engine and its record streams yield. The recoverable
//! "no data for this browser" case is not an error at all; see
//! [`crate::source::SupportLookup`].

use thiserror::Error;

/// Failures reported by a support-data source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read compat data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid compat data JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed feature node at '{path}': {reason}")]
    MalformedNode { path: String, reason: String },

    #[error("Malformed support data for '{feature}' on {browser}: {reason}")]
    MalformedSupport {
        feature: String,
        browser: String,
        reason: String,
    },
}

/// Fatal conditions that abort a traversal
#[derive(Error, Debug)]
pub enum CompatError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A prefixed statement whose owning feature cannot be resolved.
    /// Only a malformed source can produce this.
    #[error("Statement {statement_id} has prefix '{prefix}' but no owning feature reference")]
    MissingFeatureReference {
        statement_id: String,
        prefix: String,
    },
}

/// Result type for traversal operations
pub type Result<T> = std::result::Result<T, CompatError>;
