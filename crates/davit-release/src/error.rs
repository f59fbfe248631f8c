#![forbid(unsafe_code)]

use davit_forge::ForgeError;
use thiserror::Error;

/// Release run errors.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// No resolvable tag and no draft requested. Raised before any network
    /// call.
    #[error("releases requires a tag")]
    MissingTag,

    /// One or more file patterns matched nothing under the strict policy.
    /// Raised before reconciliation.
    #[error("patterns matched no files: {}", .0.join(", "))]
    UnmatchedPatterns(Vec<String>),

    /// Release lookup failed for a reason other than not-found. Never treated
    /// as "create new".
    #[error("release lookup failed: {0}")]
    Lookup(#[source] ForgeError),

    /// A file's upload failed after exhausting its retry budget.
    #[error("uploading '{name}' failed: {source}")]
    Upload {
        name: String,
        #[source]
        source: ForgeError,
    },

    #[error(transparent)]
    Forge(#[from] ForgeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReleaseResult<T> = Result<T, ReleaseError>;
