#![forbid(unsafe_code)]

//! # davit-forge
//!
//! Forge-side capability seam for release publishing.
//!
//! The explicit public contract is the [`Releaser`] trait: lookup a release by
//! tag, create or update it, and manage its assets. [`GithubReleaser`] is the
//! GitHub REST implementation; [`Throttled`] wraps any [`Releaser`] with the
//! transport-level rate-limit policy (one transparent retry on a primary rate
//! limit, abuse limits logged and never retried).
//!
//! Errors carry an HTTP-like status and a retryability classification so that
//! higher layers never see transport details.

mod error;
mod github;
mod models;
mod throttle;
mod traits;

pub use crate::{
    error::{ErrorKind, ForgeError, ForgeResult},
    github::{GithubOptions, GithubReleaser},
    models::{Release, ReleaseAsset, ReleaseParams, UploadTarget, upload_url_base},
    throttle::{RetryDecision, Throttled, throttle_decision},
    traits::Releaser,
};
