#![forbid(unsafe_code)]

//! Run orchestration: precondition gates, reconcile, upload, outputs.

use std::{path::PathBuf, sync::Arc};

use davit_forge::{ReleaseAsset, Releaser};
use tracing::{info, warn};

use crate::{
    config::ReleaseConfig,
    error::{ReleaseError, ReleaseResult},
    pipeline::upload_assets,
    reconcile::reconcile,
};

/// What the file-discovery collaborator produced: concrete deduplicated file
/// paths, plus the declared patterns that matched nothing.
#[derive(Clone, Debug, Default)]
pub struct FileSet {
    pub files: Vec<PathBuf>,
    pub unmatched: Vec<String>,
}

/// Results reported to the invoking pipeline.
#[derive(Clone, Debug)]
pub struct RunOutputs {
    /// Public release page URL.
    pub url: String,
    /// Platform release identifier.
    pub id: u64,
    /// Canonical upload URL template.
    pub upload_url: String,
    /// Final uploaded assets, in input order. `None` when nothing was
    /// uploaded, so the output is simply not reported.
    pub assets: Option<Vec<ReleaseAsset>>,
}

/// Sequences one release lifecycle: precondition gates, then reconciliation,
/// then the upload phase.
///
/// The unmatched-pattern gate and the tag gate are independent and both run
/// before any network call; configuration and pattern errors therefore abort
/// before any side effect.
///
/// # Errors
///
/// Any [`ReleaseError`]; the first fatal condition encountered wins.
pub async fn run(
    releaser: Arc<dyn Releaser>,
    config: &ReleaseConfig,
    discovered: &FileSet,
) -> ReleaseResult<RunOutputs> {
    if !config.files.is_empty() {
        if config.fail_on_unmatched_files && !discovered.unmatched.is_empty() {
            return Err(ReleaseError::UnmatchedPatterns(discovered.unmatched.clone()));
        }
        for pattern in &discovered.unmatched {
            warn!(pattern, "pattern does not match any files");
        }
    }

    let release = reconcile(releaser.as_ref(), config).await?;

    let assets = if config.files.is_empty() {
        Vec::new()
    } else if discovered.files.is_empty() {
        // Lenient policy: declared patterns, nothing matched.
        warn!("declared file patterns matched no files, nothing to upload");
        Vec::new()
    } else {
        upload_assets(Arc::clone(&releaser), &release, &discovered.files, config).await?
    };

    info!(url = %release.html_url, "release ready");
    Ok(RunOutputs {
        url: release.html_url.clone(),
        id: release.id,
        upload_url: release.upload_url.clone(),
        assets: (!assets.is_empty()).then_some(assets),
    })
}
