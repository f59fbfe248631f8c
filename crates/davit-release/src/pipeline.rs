#![forbid(unsafe_code)]

//! Asset upload pipeline.
//!
//! Every task reasons about the same baseline asset snapshot, taken once
//! before the first upload starts; results accumulate in per-index slots so
//! the reported sequence is positional in input order regardless of
//! completion order.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use davit_forge::{ForgeError, Release, ReleaseAsset, Releaser, UploadTarget, upload_url_base};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::ReleaseConfig,
    error::{ReleaseError, ReleaseResult},
    gate::UploadGate,
    retry::{RetryPolicy, retry_with_policy},
};

/// Shared per-run context for upload tasks.
struct UploadContext {
    /// Upload endpoint with the template suffix stripped.
    endpoint: Url,
    /// Asset list as it stood at pipeline start. Read-only.
    baseline: Vec<ReleaseAsset>,
    overwrite: bool,
    retry: RetryPolicy,
}

/// Uploads each file as an asset of `release` and returns the resulting
/// assets in input order. Files skipped by policy produce no entry; an empty
/// result is valid.
///
/// Bounded-parallel by default (`config.max_in_flight` simultaneous uploads,
/// queueing in submission order); strictly sequential when
/// `config.preserve_order` is set. In bounded-parallel mode a failed file
/// does not cancel its siblings; every task is joined before the first
/// error surfaces.
///
/// # Errors
///
/// [`ReleaseError::Upload`] once a file has exhausted its retry budget.
pub async fn upload_assets(
    releaser: Arc<dyn Releaser>,
    release: &Release,
    files: &[PathBuf],
    config: &ReleaseConfig,
) -> ReleaseResult<Vec<ReleaseAsset>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let ctx = Arc::new(UploadContext {
        endpoint: upload_url_base(&release.upload_url)?,
        baseline: release.assets.clone(),
        overwrite: config.overwrite_files,
        retry: config.retry.clone(),
    });

    let results = if config.preserve_order {
        upload_sequential(releaser.as_ref(), &ctx, files).await?
    } else {
        upload_bounded(releaser, ctx, files, config.max_in_flight).await?
    };

    Ok(results.into_iter().flatten().collect())
}

/// Strict input order: each file fully completes, retries included, before
/// the next begins.
async fn upload_sequential(
    releaser: &dyn Releaser,
    ctx: &UploadContext,
    files: &[PathBuf],
) -> ReleaseResult<Vec<Option<ReleaseAsset>>> {
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        results.push(upload_with_retry(releaser, ctx, path).await?);
    }
    Ok(results)
}

/// Bounded fan-out: permits are acquired in submission order, results land in
/// per-index slots, and every task is joined before the first error surfaces.
async fn upload_bounded(
    releaser: Arc<dyn Releaser>,
    ctx: Arc<UploadContext>,
    files: &[PathBuf],
    max_in_flight: usize,
) -> ReleaseResult<Vec<Option<ReleaseAsset>>> {
    let gate = UploadGate::new(max_in_flight);
    let mut handles = Vec::with_capacity(files.len());
    for (index, path) in files.iter().cloned().enumerate() {
        let permit = gate.admit().await;
        let releaser = Arc::clone(&releaser);
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            (index, upload_with_retry(releaser.as_ref(), &ctx, &path).await)
        }));
    }

    let mut slots: Vec<Option<Option<ReleaseAsset>>> = files.iter().map(|_| None).collect();
    let mut first_error = None;
    for handle in handles {
        let (index, result) = handle.await.expect("upload task panicked");
        match result {
            Ok(asset) => slots[index] = Some(asset),
            Err(error) => {
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
    }
    if let Some(error) = first_error {
        return Err(error);
    }

    Ok(slots
        .into_iter()
        .map(|slot| slot.expect("every upload task joined"))
        .collect())
}

/// Wraps the whole per-file procedure (overwrite delete + upload) in the
/// retry budget; the observer logs every failed attempt.
async fn upload_with_retry(
    releaser: &dyn Releaser,
    ctx: &UploadContext,
    path: &Path,
) -> ReleaseResult<Option<ReleaseAsset>> {
    let name = asset_name(path)?;
    let label = path.display().to_string();

    retry_with_policy(
        &ctx.retry,
        &label,
        |attempt, target| warn!(attempt, file = target, "upload attempt failed"),
        || upload_one(releaser, ctx, &name, path),
    )
    .await
    .map_err(|error| match error {
        ReleaseError::Forge(source) => ReleaseError::Upload {
            name: name.clone(),
            source,
        },
        other => other,
    })
}

/// One attempt: delete a same-named baseline asset (overwrite semantics),
/// then stream the file to the upload endpoint.
async fn upload_one(
    releaser: &dyn Releaser,
    ctx: &UploadContext,
    name: &str,
    path: &Path,
) -> ReleaseResult<Option<ReleaseAsset>> {
    if let Some(existing) = ctx.baseline.iter().find(|asset| asset.name == name) {
        if !ctx.overwrite {
            warn!(name, "asset already exists and overwrite is disabled, skipping");
            return Ok(None);
        }
        debug!(name, id = existing.id, "deleting existing asset before re-upload");
        match releaser.delete_asset(existing.id).await {
            Ok(()) => {}
            // A previous attempt of this file may have deleted it already.
            Err(error) if error.is_not_found() => {
                debug!(name, id = existing.id, "existing asset already gone");
            }
            Err(error) => return Err(ReleaseError::Forge(error)),
        }
    }

    let size = tokio::fs::metadata(path)
        .await
        .map_err(|error| ReleaseError::Forge(ForgeError::io(error)))?
        .len();
    let target = UploadTarget {
        url: ctx.endpoint.clone(),
        name: name.to_owned(),
        size,
        content_type: content_type_for(path).to_owned(),
    };
    let asset = releaser
        .upload_asset(&target, path)
        .await
        .map_err(ReleaseError::Forge)?;
    debug!(name, id = asset.id, size = asset.size, "asset uploaded");
    Ok(Some(asset))
}

/// Asset name is the file's base name.
fn asset_name(path: &Path) -> ReleaseResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            ReleaseError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no usable file name in {}", path.display()),
            ))
        })
}

/// Best-effort content type from the file extension.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("zip") => "application/zip",
        Some("gz" | "tgz") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("json") => "application/json",
        Some("txt" | "md") => "text/plain",
        Some("wasm") => "application/wasm",
        Some("sig" | "asc") => "application/pgp-signature",
        _ => "application/octet-stream",
    }
}
