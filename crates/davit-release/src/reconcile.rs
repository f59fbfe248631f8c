#![forbid(unsafe_code)]

//! Release reconciliation: one canonical release per tag.

use davit_forge::{Release, ReleaseParams, Releaser};
use tracing::{debug, info};

use crate::{
    config::ReleaseConfig,
    error::{ReleaseError, ReleaseResult},
};

/// Produces exactly one release representing the desired end state for the
/// configured tag.
///
/// An existing release is updated in place with the supplied fields merged
/// over its current values; fields the caller left unset are preserved. An
/// absent release (not-found lookup) is created with the supplied fields.
/// Any other lookup failure is fatal; an outage is never mistaken for
/// "absent", so no duplicate release can be created.
///
/// # Errors
///
/// [`ReleaseError::MissingTag`] when no tag is resolvable and no draft was
/// requested (raised before any network call), [`ReleaseError::Lookup`] for
/// non-404 lookup failures, [`ReleaseError::Forge`] for create/update
/// failures.
pub async fn reconcile(
    releaser: &dyn Releaser,
    config: &ReleaseConfig,
) -> ReleaseResult<Release> {
    let tag = match config.resolved_tag() {
        Some(tag) => tag.to_owned(),
        // Drafts do not require a resolvable tag.
        None if config.draft == Some(true) => config.tag_name.clone().unwrap_or_default(),
        None => return Err(ReleaseError::MissingTag),
    };

    // An empty tag only occurs for drafts; nothing to look up then.
    let existing = if tag.is_empty() {
        None
    } else {
        releaser
            .release_by_tag(&tag)
            .await
            .map_err(ReleaseError::Lookup)?
    };

    match existing {
        Some(existing) => {
            debug!(tag, id = existing.id, "found existing release, updating");
            let params = merged_params(&tag, config, &existing);
            let updated = releaser.update_release(existing.id, &params).await?;
            info!(tag, id = updated.id, "release updated");
            Ok(updated)
        }
        None => {
            debug!(tag, "no release for tag, creating");
            let created = releaser.create_release(&supplied_params(&tag, config)).await?;
            info!(tag, id = created.id, "release created");
            Ok(created)
        }
    }
}

/// Supplied fields merged over the existing release: unset fields keep their
/// current values.
fn merged_params(tag: &str, config: &ReleaseConfig, existing: &Release) -> ReleaseParams {
    ReleaseParams {
        tag_name: tag.to_owned(),
        name: config.release_name.clone().or_else(|| existing.name.clone()),
        body: config.body.clone().or_else(|| existing.body.clone()),
        draft: Some(config.draft.unwrap_or(existing.draft)),
        prerelease: Some(config.prerelease.unwrap_or(existing.prerelease)),
        target_commitish: config
            .target_commitish
            .clone()
            .or_else(|| existing.target_commitish.clone()),
    }
}

fn supplied_params(tag: &str, config: &ReleaseConfig) -> ReleaseParams {
    ReleaseParams {
        tag_name: tag.to_owned(),
        name: config.release_name.clone(),
        body: config.body.clone(),
        draft: config.draft,
        prerelease: config.prerelease,
        target_commitish: config.target_commitish.clone(),
    }
}
