#![allow(dead_code)]

//! Shared test doubles: a recording `Releaser` with failure injection,
//! artificial latency, and in-flight accounting.

use std::{
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use davit_forge::{
    ForgeError, ForgeResult, Release, ReleaseAsset, ReleaseParams, Releaser, UploadTarget,
};

/// One recorded forge operation, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Lookup(String),
    Create(ReleaseParams),
    Update(u64, ReleaseParams),
    ListAssets(u64),
    Delete(u64),
    Upload(String),
}

pub struct MockReleaser {
    existing: Option<Release>,
    lookup_error: Option<ForgeError>,
    delete_error: Option<ForgeError>,
    /// Uploads whose name matches (all names when `None`) fail while the
    /// budget lasts.
    fail_name: Option<String>,
    failures_left: AtomicUsize,
    /// Per-name artificial latency, for completion-order tests.
    delays: Vec<(String, Duration)>,
    calls: Mutex<Vec<Call>>,
    next_asset_id: AtomicU64,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
}

impl Default for MockReleaser {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReleaser {
    pub fn new() -> Self {
        Self {
            existing: None,
            lookup_error: None,
            delete_error: None,
            fail_name: None,
            failures_left: AtomicUsize::new(0),
            delays: Vec::new(),
            calls: Mutex::new(Vec::new()),
            next_asset_id: AtomicU64::new(100),
            in_flight: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
        }
    }

    pub fn with_existing(mut self, release: Release) -> Self {
        self.existing = Some(release);
        self
    }

    pub fn with_lookup_error(mut self, error: ForgeError) -> Self {
        self.lookup_error = Some(error);
        self
    }

    pub fn with_delete_error(mut self, error: ForgeError) -> Self {
        self.delete_error = Some(error);
        self
    }

    /// Fails the next `count` uploads, regardless of name.
    pub fn failing_uploads(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Fails the next `count` uploads of one specific asset name.
    pub fn failing_uploads_named(mut self, name: &str, count: usize) -> Self {
        self.fail_name = Some(name.to_owned());
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_upload_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.push((name.to_owned(), delay));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Uploaded asset names, in the order upload calls started.
    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Highest number of simultaneously in-flight uploads observed.
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn should_fail(&self, name: &str) -> bool {
        if let Some(fail_name) = &self.fail_name
            && fail_name != name
        {
            return false;
        }
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }
}

#[async_trait]
impl Releaser for MockReleaser {
    async fn release_by_tag(&self, tag: &str) -> ForgeResult<Option<Release>> {
        self.record(Call::Lookup(tag.to_owned()));
        if let Some(error) = &self.lookup_error {
            return Err(error.clone());
        }
        Ok(self
            .existing
            .clone()
            .filter(|release| release.tag_name == tag))
    }

    async fn create_release(&self, params: &ReleaseParams) -> ForgeResult<Release> {
        self.record(Call::Create(params.clone()));
        Ok(release_from_params(200, params, Vec::new()))
    }

    async fn update_release(&self, id: u64, params: &ReleaseParams) -> ForgeResult<Release> {
        self.record(Call::Update(id, params.clone()));
        let assets = self
            .existing
            .as_ref()
            .map(|release| release.assets.clone())
            .unwrap_or_default();
        Ok(release_from_params(id, params, assets))
    }

    async fn list_assets(&self, release_id: u64) -> ForgeResult<Vec<ReleaseAsset>> {
        self.record(Call::ListAssets(release_id));
        Ok(self
            .existing
            .as_ref()
            .map(|release| release.assets.clone())
            .unwrap_or_default())
    }

    async fn delete_asset(&self, asset_id: u64) -> ForgeResult<()> {
        self.record(Call::Delete(asset_id));
        match &self.delete_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn upload_asset(&self, target: &UploadTarget, _file: &Path) -> ForgeResult<ReleaseAsset> {
        self.record(Call::Upload(target.name.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .iter()
            .find(|(name, _)| name == &target.name)
            .map(|(_, delay)| *delay)
            .unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.should_fail(&target.name) {
            return Err(ForgeError::status(500, "https://uploads.example.com", None));
        }

        Ok(ReleaseAsset {
            id: self.next_asset_id.fetch_add(1, Ordering::SeqCst),
            name: target.name.clone(),
            size: target.size,
            content_type: target.content_type.clone(),
            state: "uploaded".to_owned(),
            browser_download_url: format!("https://example.com/dl/{}", target.name),
        })
    }
}

fn release_from_params(id: u64, params: &ReleaseParams, assets: Vec<ReleaseAsset>) -> Release {
    Release {
        id,
        tag_name: params.tag_name.clone(),
        name: params.name.clone(),
        body: params.body.clone(),
        html_url: format!("https://example.com/me/proj/releases/{}", params.tag_name),
        upload_url: format!("https://uploads.example.com/{id}/assets{{?name,label}}"),
        draft: params.draft.unwrap_or(false),
        prerelease: params.prerelease.unwrap_or(false),
        target_commitish: params.target_commitish.clone(),
        assets,
    }
}

pub fn release_fixture(tag: &str, assets: Vec<ReleaseAsset>) -> Release {
    Release {
        id: 7,
        tag_name: tag.to_owned(),
        name: Some("First".to_owned()),
        body: Some("notes".to_owned()),
        html_url: format!("https://example.com/me/proj/releases/{tag}"),
        upload_url: "https://uploads.example.com/7/assets{?name,label}".to_owned(),
        draft: false,
        prerelease: false,
        target_commitish: Some("main".to_owned()),
        assets,
    }
}

pub fn asset_fixture(id: u64, name: &str) -> ReleaseAsset {
    ReleaseAsset {
        id,
        name: name.to_owned(),
        size: 42,
        content_type: "application/octet-stream".to_owned(),
        state: "uploaded".to_owned(),
        browser_download_url: format!("https://example.com/dl/{name}"),
    }
}
