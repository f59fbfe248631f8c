#![forbid(unsafe_code)]

//! GitHub REST implementation of the [`Releaser`] capability.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Body, Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, RETRY_AFTER, USER_AGENT},
};
use tokio_util::io::ReaderStream;
use url::Url;

use crate::{
    error::{ForgeError, ForgeResult},
    models::{AssetResponse, Release, ReleaseAsset, ReleaseParams, UploadTarget},
    traits::Releaser,
};

const DEFAULT_API_URL: &str = "https://api.github.com";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const AGENT: &str = concat!("davit/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`GithubReleaser`].
#[derive(Clone, Debug)]
pub struct GithubOptions {
    /// REST API base URL. Override for GHES or tests.
    pub api_url: Url,
    pub token: String,
    pub owner: String,
    pub repo: String,
    /// Timeout for non-upload requests. Uploads have no timeout since large
    /// assets can take arbitrary time.
    pub request_timeout: Duration,
}

impl Default for GithubOptions {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL parses"),
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl GithubOptions {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }
}

/// GitHub REST client for release and asset operations.
#[derive(Clone, Debug)]
pub struct GithubReleaser {
    inner: Client,
    options: GithubOptions,
}

impl GithubReleaser {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build.
    #[must_use]
    pub fn new(options: GithubOptions) -> Self {
        let inner = Client::builder()
            .build()
            .expect("failed to build reqwest client");
        Self { inner, options }
    }

    fn repo_url(&self, rest: &str) -> ForgeResult<Url> {
        let path = format!(
            "repos/{}/{}/{}",
            self.options.owner, self.options.repo, rest
        );
        self.options
            .api_url
            .join(&path)
            .map_err(|e| ForgeError::Http(e.to_string()))
    }

    fn apply_headers(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(AUTHORIZATION, format!("token {}", self.options.token))
            .header(ACCEPT, ACCEPT_JSON)
            .header(USER_AGENT, AGENT)
            .timeout(self.options.request_timeout)
    }

    /// Maps a non-success response to the crate error, distinguishing primary
    /// rate limits (retryable once upstream) from secondary/abuse limits
    /// (never retried).
    async fn error_for(url: Url, resp: Response) -> ForgeError {
        let status = resp.status().as_u16();
        let remaining = resp
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = resp.text().await.unwrap_or_default();

        if status == 403 || status == 429 {
            if body.contains("secondary rate limit") || body.contains("abuse") {
                return ForgeError::AbuseLimited {
                    url: url.to_string(),
                };
            }
            if status == 429 || remaining.as_deref() == Some("0") || retry_after.is_some() {
                return ForgeError::RateLimited {
                    url: url.to_string(),
                    retry_after,
                };
            }
        }

        ForgeError::status(status, url.to_string(), Some(body))
    }

    async fn check(url: Url, resp: Response) -> ForgeResult<Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(Self::error_for(url, resp).await)
        }
    }
}

#[async_trait]
impl Releaser for GithubReleaser {
    async fn release_by_tag(&self, tag: &str) -> ForgeResult<Option<Release>> {
        let url = self.repo_url(&format!("releases/tags/{tag}"))?;
        let req = self.apply_headers(self.inner.get(url.clone()));

        let resp = req.send().await.map_err(ForgeError::from)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(url, resp).await?;
        let release = resp.json::<Release>().await.map_err(ForgeError::from)?;
        Ok(Some(release))
    }

    async fn create_release(&self, params: &ReleaseParams) -> ForgeResult<Release> {
        let url = self.repo_url("releases")?;
        let req = self.apply_headers(self.inner.post(url.clone())).json(params);

        let resp = req.send().await.map_err(ForgeError::from)?;
        let resp = Self::check(url, resp).await?;
        resp.json::<Release>().await.map_err(ForgeError::from)
    }

    async fn update_release(&self, id: u64, params: &ReleaseParams) -> ForgeResult<Release> {
        let url = self.repo_url(&format!("releases/{id}"))?;
        let req = self
            .apply_headers(self.inner.patch(url.clone()))
            .json(params);

        let resp = req.send().await.map_err(ForgeError::from)?;
        let resp = Self::check(url, resp).await?;
        resp.json::<Release>().await.map_err(ForgeError::from)
    }

    async fn list_assets(&self, release_id: u64) -> ForgeResult<Vec<ReleaseAsset>> {
        let url = self.repo_url(&format!("releases/{release_id}/assets"))?;
        let req = self.apply_headers(self.inner.get(url.clone()));

        let resp = req.send().await.map_err(ForgeError::from)?;
        let resp = Self::check(url, resp).await?;
        let raw = resp
            .json::<Vec<AssetResponse>>()
            .await
            .map_err(ForgeError::from)?;
        Ok(raw.into_iter().map(ReleaseAsset::from).collect())
    }

    async fn delete_asset(&self, asset_id: u64) -> ForgeResult<()> {
        let url = self.repo_url(&format!("releases/assets/{asset_id}"))?;
        let req = self.apply_headers(self.inner.delete(url.clone()));

        let resp = req.send().await.map_err(ForgeError::from)?;
        Self::check(url, resp).await?;
        Ok(())
    }

    async fn upload_asset(&self, target: &UploadTarget, file: &Path) -> ForgeResult<ReleaseAsset> {
        let mut url = target.url.clone();
        url.query_pairs_mut().append_pair("name", &target.name);

        let file = tokio::fs::File::open(file).await.map_err(ForgeError::io)?;
        let body = Body::wrap_stream(ReaderStream::new(file));

        // No timeout: asset uploads can take arbitrary time.
        let req = self
            .inner
            .post(url.clone())
            .header(AUTHORIZATION, format!("token {}", self.options.token))
            .header(ACCEPT, ACCEPT_JSON)
            .header(USER_AGENT, AGENT)
            .header(CONTENT_TYPE, target.content_type.as_str())
            .header(CONTENT_LENGTH, target.size)
            .body(body);

        let resp = req.send().await.map_err(ForgeError::from)?;
        let resp = Self::check(url, resp).await?;
        let raw = resp
            .json::<AssetResponse>()
            .await
            .map_err(ForgeError::from)?;
        Ok(raw.into())
    }
}
