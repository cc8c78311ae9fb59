use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Platform;

/// Normalized build information rendered into notifications.
///
/// `download_url` is never empty once extraction succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetadata {
    pub platform: Platform,
    pub app_name: String,
    pub version: String,
    pub build_number: String,
    pub release_date: String,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_hash: Option<String>,
}

impl BuildMetadata {
    /// Fixed sample build used by manual test notifications
    pub fn sample(platform: Platform, now: DateTime<Utc>) -> Self {
        Self {
            platform,
            app_name: format!("Test App ({})", platform.label()),
            version: "1.0.0".to_string(),
            build_number: "123".to_string(),
            release_date: now.to_rfc3339(),
            download_url: "https://appdistribution.firebase.dev/test".to_string(),
            release_notes: Some(
                "This is a test notification from the App Distribution Bot.\n\n\
                 • Test feature 1\n• Test feature 2\n• Bug fixes"
                    .to_string(),
            ),
            file_size: None,
            md5_hash: None,
        }
    }
}
