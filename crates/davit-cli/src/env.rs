//! Environment-driven configuration, GitHub Actions `INPUT_*` style.
//!
//! Parsing works on an iterator of key/value pairs so the environment is read
//! exactly once, in `main`; no component touches ambient state.

use std::collections::HashMap;

use anyhow::{Context, Result};
use davit_release::ReleaseConfig;

/// Builds the immutable run configuration from environment pairs.
///
/// Tri-state booleans (`draft`, `prerelease`) stay unset when the variable is
/// absent or empty, so updating an existing release preserves its current
/// values.
pub fn config_from_env<I>(vars: I) -> Result<ReleaseConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: HashMap<String, String> = vars.into_iter().collect();
    let get = |key: &str| {
        vars.get(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    };
    let tri = |key: &str| get(key).map(|value| value == "true");
    let flag = |key: &str, default: bool| tri(key).unwrap_or(default);

    let body = match get("INPUT_BODY_PATH") {
        Some(path) => Some(
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading release body from {path}"))?,
        ),
        None => get("INPUT_BODY"),
    };

    let files = get("INPUT_FILES")
        .map(|raw| {
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(ReleaseConfig {
        token: get("INPUT_TOKEN")
            .or_else(|| get("GITHUB_TOKEN"))
            .unwrap_or_default(),
        repository: get("INPUT_REPOSITORY")
            .or_else(|| get("GITHUB_REPOSITORY"))
            .unwrap_or_default(),
        tag_name: get("INPUT_TAG_NAME"),
        ref_name: get("GITHUB_REF").unwrap_or_default(),
        release_name: get("INPUT_NAME"),
        body,
        draft: tri("INPUT_DRAFT"),
        prerelease: tri("INPUT_PRERELEASE"),
        target_commitish: get("INPUT_TARGET_COMMITISH"),
        files,
        overwrite_files: flag("INPUT_OVERWRITE_FILES", true),
        preserve_order: flag("INPUT_PRESERVE_ORDER", false),
        fail_on_unmatched_files: flag("INPUT_FAIL_ON_UNMATCHED_FILES", false),
        ..ReleaseConfig::default()
    })
}
