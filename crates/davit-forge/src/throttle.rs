#![forbid(unsafe_code)]

//! Transport-level rate-limit policy.
//!
//! A primary rate limit gets exactly one transparent retry, after the delay
//! the forge advertised. Abuse (secondary) limits are logged and never
//! retried. Everything else passes through untouched; attempt-budget retries
//! live one layer up, in the release pipeline.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use crate::{
    error::{ForgeError, ForgeResult},
    models::{Release, ReleaseAsset, ReleaseParams, UploadTarget},
    traits::Releaser,
};

const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(60);

/// What to do with a failed transport attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Pure decision function: retry a primary rate limit once, nothing else.
pub fn throttle_decision(attempt: u32, error: &ForgeError) -> RetryDecision {
    match error {
        ForgeError::RateLimited { retry_after, .. } if attempt == 0 => {
            RetryDecision::RetryAfter(retry_after.unwrap_or(DEFAULT_RATE_LIMIT_DELAY))
        }
        _ => RetryDecision::GiveUp,
    }
}

/// Rate-limit decorator for [`Releaser`] implementations.
pub struct Throttled<R> {
    inner: R,
}

impl<R: Releaser> Throttled<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Pauses before the single transparent retry, or propagates the error.
    async fn pause_or_bail(attempt: u32, error: ForgeError) -> ForgeResult<()> {
        if let ForgeError::AbuseLimited { url } = &error {
            warn!(%url, "abuse limit reported, not retrying");
            return Err(error);
        }
        match throttle_decision(attempt, &error) {
            RetryDecision::RetryAfter(delay) => {
                warn!(?delay, "rate limited, retrying once");
                sleep(delay).await;
                Ok(())
            }
            RetryDecision::GiveUp => Err(error),
        }
    }
}

#[async_trait]
impl<R: Releaser> Releaser for Throttled<R> {
    async fn release_by_tag(&self, tag: &str) -> ForgeResult<Option<Release>> {
        let mut attempt = 0;
        loop {
            match self.inner.release_by_tag(tag).await {
                Ok(found) => return Ok(found),
                Err(error) => {
                    Self::pause_or_bail(attempt, error).await?;
                    attempt += 1;
                }
            }
        }
    }

    async fn create_release(&self, params: &ReleaseParams) -> ForgeResult<Release> {
        let mut attempt = 0;
        loop {
            match self.inner.create_release(params).await {
                Ok(release) => return Ok(release),
                Err(error) => {
                    Self::pause_or_bail(attempt, error).await?;
                    attempt += 1;
                }
            }
        }
    }

    async fn update_release(&self, id: u64, params: &ReleaseParams) -> ForgeResult<Release> {
        let mut attempt = 0;
        loop {
            match self.inner.update_release(id, params).await {
                Ok(release) => return Ok(release),
                Err(error) => {
                    Self::pause_or_bail(attempt, error).await?;
                    attempt += 1;
                }
            }
        }
    }

    async fn list_assets(&self, release_id: u64) -> ForgeResult<Vec<ReleaseAsset>> {
        let mut attempt = 0;
        loop {
            match self.inner.list_assets(release_id).await {
                Ok(assets) => return Ok(assets),
                Err(error) => {
                    Self::pause_or_bail(attempt, error).await?;
                    attempt += 1;
                }
            }
        }
    }

    async fn delete_asset(&self, asset_id: u64) -> ForgeResult<()> {
        let mut attempt = 0;
        loop {
            match self.inner.delete_asset(asset_id).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    Self::pause_or_bail(attempt, error).await?;
                    attempt += 1;
                }
            }
        }
    }

    async fn upload_asset(&self, target: &UploadTarget, file: &Path) -> ForgeResult<ReleaseAsset> {
        let mut attempt = 0;
        loop {
            match self.inner.upload_asset(target, file).await {
                Ok(asset) => return Ok(asset),
                Err(error) => {
                    Self::pause_or_bail(attempt, error).await?;
                    attempt += 1;
                }
            }
        }
    }
}
