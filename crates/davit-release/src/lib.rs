#![forbid(unsafe_code)]

//! # davit-release
//!
//! Core release lifecycle: reconcile one release by tag (find, create, or
//! update), then hoist local files onto it as assets.
//!
//! ## Phases
//!
//! 1. Precondition gates: unmatched file patterns, then tag resolvability.
//!    Both run before any network call.
//! 2. [`reconcile`]: exactly one canonical [`Release`](davit_forge::Release)
//!    for the configured tag. Found releases are updated with supplied fields
//!    merged over existing values; absent releases are created. Only the
//!    not-found status means "absent"; any other lookup failure is fatal, so
//!    an outage never produces a duplicate release.
//! 3. [`upload_assets`]: every file uploaded exactly once against a baseline
//!    asset snapshot, overwriting same-named assets, bounded-parallel by
//!    default or strictly sequential with
//!    [`preserve_order`](ReleaseConfig::preserve_order).
//!
//! [`run`] sequences the phases and shapes the outputs for the invoking
//! pipeline.

mod config;
mod error;
mod gate;
mod pipeline;
mod reconcile;
mod retry;
mod run;

pub use crate::{
    config::{DEFAULT_MAX_IN_FLIGHT, ReleaseConfig},
    error::{ReleaseError, ReleaseResult},
    gate::UploadGate,
    pipeline::upload_assets,
    reconcile::reconcile,
    retry::{RetryPolicy, retry_with_policy},
    run::{FileSet, RunOutputs, run},
};
