#![forbid(unsafe_code)]

use std::path::Path;

use async_trait::async_trait;

use crate::{
    error::ForgeResult,
    models::{Release, ReleaseAsset, ReleaseParams, UploadTarget},
};

/// Release/asset operations of a software forge.
///
/// Owner/repo scope is implicit in the implementation. Every operation fails
/// with a [`ForgeError`](crate::ForgeError) carrying an HTTP-like status and a
/// retryability classification; transport details never leak upward.
#[async_trait]
pub trait Releaser: Send + Sync {
    /// Look up a release by its tag (exact, case-sensitive match).
    ///
    /// Returns `Ok(None)` only for the not-found status; every other failure
    /// is an error so callers never mistake an outage for an absent release.
    async fn release_by_tag(&self, tag: &str) -> ForgeResult<Option<Release>>;

    /// Create a new release.
    async fn create_release(&self, params: &ReleaseParams) -> ForgeResult<Release>;

    /// Update an existing release in place.
    async fn update_release(&self, id: u64, params: &ReleaseParams) -> ForgeResult<Release>;

    /// List the assets currently attached to a release.
    async fn list_assets(&self, release_id: u64) -> ForgeResult<Vec<ReleaseAsset>>;

    /// Delete an asset.
    async fn delete_asset(&self, asset_id: u64) -> ForgeResult<()>;

    /// Stream a local file to the upload endpoint as a new asset.
    async fn upload_asset(&self, target: &UploadTarget, file: &Path) -> ForgeResult<ReleaseAsset>;
}
