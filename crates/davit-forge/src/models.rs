#![forbid(unsafe_code)]

//! Wire models for forge releases and their assets.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ForgeError, ForgeResult};

/// A published (or draft) release record on the forge.
///
/// Identity for lookup purposes is the tag, not `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    /// Upload endpoint template as returned by the forge, e.g.
    /// `https://uploads.example.com/repos/o/r/releases/1/assets{?name,label}`.
    pub upload_url: String,
    pub draft: bool,
    pub prerelease: bool,
    #[serde(default)]
    pub target_commitish: Option<String>,
    #[serde(default, deserialize_with = "deserialize_assets")]
    pub assets: Vec<ReleaseAsset>,
}

/// A binary file attached to a release, addressable by name.
///
/// Carries no uploader/actor identity metadata; the wire type that does is
/// converted (and stripped) before leaving this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub browser_download_url: String,
}

/// Raw asset payload as the forge returns it.
///
/// The `uploader` object is deserialized but dropped on conversion, so
/// identity metadata about who performed an upload never leaves this crate.
#[derive(Debug, Deserialize)]
pub(crate) struct AssetResponse {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub browser_download_url: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub uploader: Option<serde_json::Value>,
}

impl From<AssetResponse> for ReleaseAsset {
    fn from(raw: AssetResponse) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            size: raw.size,
            content_type: raw.content_type,
            state: raw.state,
            browser_download_url: raw.browser_download_url,
        }
    }
}

fn deserialize_assets<'de, D>(deserializer: D) -> Result<Vec<ReleaseAsset>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<AssetResponse>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(ReleaseAsset::from).collect())
}

/// Create/update payload for a release.
///
/// `None` fields are omitted from the serialized JSON so the forge keeps its
/// existing (or default) values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseParams {
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
}

/// Resolved upload endpoint plus per-asset metadata for one upload call.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    /// Upload endpoint with the template suffix stripped.
    pub url: Url,
    /// Asset name, unique within the release.
    pub name: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Best-effort content type.
    pub content_type: String,
}

/// Strips the `{?name,label}` template suffix from an upload URL.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidUploadUrl`] when the remainder does not parse
/// as a URL.
pub fn upload_url_base(template: &str) -> ForgeResult<Url> {
    let base = match template.find('{') {
        Some(pos) => &template[..pos],
        None => template,
    };
    Url::parse(base).map_err(|_| ForgeError::InvalidUploadUrl(template.to_owned()))
}
