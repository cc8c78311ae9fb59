//! Build metadata extraction and the distribution platform seam.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::BestEffort;
use crate::error::{AppError, AppResult};
use crate::models::{BuildMetadata, Platform, ReleaseEvent, TesterGroup};

/// Calls into the distribution platform
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    /// Download link for a release
    async fn download_url(&self, release_id: &str) -> AppResult<String>;

    /// Full metadata for a release, if the platform knows it
    async fn release_metadata(&self, release_id: &str) -> AppResult<Option<BuildMetadata>>;

    /// Grants testers access to a release
    async fn add_testers(&self, release_id: &str, emails: &[String]) -> AppResult<()>;
}

/// Stand-in for the platform API: synthesizes links, knows no releases
pub struct PlaceholderReleaseApi {
    download_host: String,
}

impl PlaceholderReleaseApi {
    pub fn new(download_host: impl Into<String>) -> Self {
        Self {
            download_host: download_host.into(),
        }
    }
}

#[async_trait]
impl ReleaseApi for PlaceholderReleaseApi {
    async fn download_url(&self, release_id: &str) -> AppResult<String> {
        Ok(format!("https://{}/i/{}", self.download_host, release_id))
    }

    async fn release_metadata(&self, release_id: &str) -> AppResult<Option<BuildMetadata>> {
        log::debug!("No release lookup available for {}", release_id);
        Ok(None)
    }

    async fn add_testers(&self, release_id: &str, emails: &[String]) -> AppResult<()> {
        log::debug!(
            "Would add {} testers to release {}: {:?}",
            emails.len(),
            release_id,
            emails
        );
        Ok(())
    }
}

/// Source of tester groups per platform
#[async_trait]
pub trait TesterGroupStore: Send + Sync {
    async fn tester_groups(&self, platform: Platform) -> AppResult<Vec<TesterGroup>>;
}

/// Tester groups read from a JSON document keyed by platform:
///
/// ```json
/// { "android": [{ "groupId": "qa", "displayName": "QA", "emails": ["a@example.com"] }] }
/// ```
pub struct FileTesterGroupStore {
    path: PathBuf,
}

impl FileTesterGroupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TesterGroupStore for FileTesterGroupStore {
    async fn tester_groups(&self, platform: Platform) -> AppResult<Vec<TesterGroup>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("No tester groups configured at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read tester groups from {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut groups: HashMap<String, Vec<TesterGroup>> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("Invalid tester groups document: {}", e)))?;

        Ok(groups.remove(platform.as_str()).unwrap_or_default())
    }
}

/// Turns release events into [`BuildMetadata`]
pub struct DistributionService {
    api: Arc<dyn ReleaseApi>,
    testers: Option<Arc<dyn TesterGroupStore>>,
}

impl DistributionService {
    pub fn new(api: Arc<dyn ReleaseApi>) -> Self {
        Self { api, testers: None }
    }

    /// Enables tester registration for every processed release
    pub fn with_tester_groups(mut self, store: Arc<dyn TesterGroupStore>) -> Self {
        self.testers = Some(store);
        self
    }

    /// Extracts build metadata from a release event.
    ///
    /// Only a failure to resolve the download URL is returned; tester
    /// registration problems are logged.
    pub async fn extract_metadata(&self, event: &ReleaseEvent) -> AppResult<BuildMetadata> {
        let release = &event.release;
        let app = &event.app;

        log::info!(
            "Processing {} for release {} ({})",
            event.kind.as_str(),
            release.release_id,
            app.platform
        );

        let download_url = self.resolve_download_url(event).await?;

        let metadata = BuildMetadata {
            platform: app.platform,
            app_name: app.display_name.clone(),
            version: release.display_version.clone(),
            build_number: release.build_version.clone(),
            release_date: release.create_time.clone(),
            download_url,
            release_notes: event.notes().map(str::to_string),
            file_size: None,
            md5_hash: None,
        };

        let _ = self.manage_testers(&release.release_id, app.platform).await;

        log::info!(
            "Extracted build metadata: {} {} ({}) for {}",
            metadata.app_name,
            metadata.version,
            metadata.build_number,
            metadata.platform
        );
        Ok(metadata)
    }

    /// Uses the event's link, falling back to the platform API
    async fn resolve_download_url(&self, event: &ReleaseEvent) -> AppResult<String> {
        if let Some(url) = event.release.download_url.as_deref() {
            if !url.is_empty() {
                return Ok(url.to_string());
            }
        }

        let release_id = &event.release.release_id;
        match self.api.download_url(release_id).await {
            Ok(url) if !url.is_empty() => Ok(url),
            Ok(_) => Err(AppError::Extraction(format!(
                "empty download URL for release {}",
                release_id
            ))),
            Err(e) => {
                log::error!("Failed to get download URL for {}: {}", release_id, e);
                Err(AppError::Extraction(format!(
                    "Failed to retrieve download URL: {}",
                    e
                )))
            }
        }
    }

    /// Registers the platform's tester groups against a release
    pub async fn manage_testers(&self, release_id: &str, platform: Platform) -> BestEffort {
        let Some(store) = &self.testers else {
            return BestEffort::Skipped;
        };

        let groups = match store.tester_groups(platform).await {
            Ok(groups) => groups,
            Err(e) => {
                log::error!(
                    "Failed to get tester groups for {} (release {}): {}",
                    platform,
                    release_id,
                    e
                );
                return BestEffort::Failed(e.to_string());
            }
        };

        let mut outcome = BestEffort::Done;
        for group in &groups {
            match self.api.add_testers(release_id, &group.emails).await {
                Ok(()) => log::debug!(
                    "Added {} testers from group {} to release {}",
                    group.emails.len(),
                    group.group_id,
                    release_id
                ),
                Err(e) => {
                    log::error!(
                        "Failed to add group {} to release {}: {}",
                        group.group_id,
                        release_id,
                        e
                    );
                    outcome = BestEffort::Failed(e.to_string());
                }
            }
        }
        outcome
    }

    /// Metadata for a release id, or `None` when the platform cannot provide it
    pub async fn release_metadata(&self, release_id: &str) -> Option<BuildMetadata> {
        match self.api.release_metadata(release_id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                log::error!("Failed to get release metadata for {}: {}", release_id, e);
                None
            }
        }
    }
}
