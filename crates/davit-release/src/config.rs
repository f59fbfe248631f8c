#![forbid(unsafe_code)]

//! Immutable run configuration.

use crate::retry::RetryPolicy;

/// Upload concurrency ceiling in bounded-parallel mode.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Configuration for one release run, constructed once at process start and
/// passed by reference to every component.
///
/// `Option` fields distinguish "caller left unset" from an explicit value so
/// that updating an existing release preserves its current values (merge,
/// don't overwrite).
#[derive(Clone, Debug)]
pub struct ReleaseConfig {
    /// Forge access token.
    pub token: String,
    /// `owner/repo` slug.
    pub repository: String,
    /// Explicit tag name. Falls back to the tag of `ref_name` when unset.
    pub tag_name: Option<String>,
    /// The triggering ref, e.g. `refs/tags/v1.0.0` or `refs/heads/main`.
    pub ref_name: String,
    /// Release display name.
    pub release_name: Option<String>,
    /// Release body text.
    pub body: Option<String>,
    pub draft: Option<bool>,
    pub prerelease: Option<bool>,
    /// Commitish the tag should point at when the forge creates it.
    pub target_commitish: Option<String>,
    /// File glob patterns naming the assets to upload.
    pub files: Vec<String>,
    /// Replace same-named existing assets (delete, then re-upload).
    pub overwrite_files: bool,
    /// Upload strictly one file at a time, in input order.
    pub preserve_order: bool,
    /// Treat a pattern that matches no files as fatal.
    pub fail_on_unmatched_files: bool,
    /// Ceiling on simultaneously in-flight uploads (bounded-parallel mode).
    pub max_in_flight: usize,
    /// Per-file retry budget for uploads.
    pub retry: RetryPolicy,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            repository: String::new(),
            tag_name: None,
            ref_name: String::new(),
            release_name: None,
            body: None,
            draft: None,
            prerelease: None,
            target_commitish: None,
            files: Vec::new(),
            overwrite_files: true,
            preserve_order: false,
            fail_on_unmatched_files: false,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ReleaseConfig {
    /// The tag this run operates on: the explicit `tag_name`, or the suffix
    /// of `ref_name` when the triggering ref is itself a tag ref.
    ///
    /// Exact match only; no normalization beyond stripping `refs/tags/`.
    pub fn resolved_tag(&self) -> Option<&str> {
        if let Some(tag) = self.tag_name.as_deref()
            && !tag.is_empty()
        {
            return Some(tag);
        }
        self.ref_name
            .strip_prefix("refs/tags/")
            .filter(|tag| !tag.is_empty())
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_files(mut self, patterns: Vec<String>) -> Self {
        self.files = patterns;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
