use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{FeatureFlag, Job, PermissionTier};

/// Per-file summary echoed back after an upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFileInfo {
    /// Generated on-disk name (`<uuid>.<ext>`), never the caller-supplied name.
    pub filename: String,
    pub originalname: String,
    pub size: u64,
    pub mimetype: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub files: UploadedFiles,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFiles {
    pub html_file: StoredFileInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_file: Option<StoredFileInfo>,
}

/// Request to convert a previously uploaded bundle into an APK artifact.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    #[garde(length(max = 100))]
    pub app_name: Option<String>,

    #[garde(length(max = 200))]
    pub package_name: Option<String>,

    #[garde(length(min = 1, max = 32))]
    pub version: Option<String>,

    #[garde(skip)]
    pub permissions: Option<PermissionTier>,

    #[garde(skip)]
    pub features: Option<Vec<FeatureFlag>>,

    #[garde(length(max = 255))]
    pub html_filename: Option<String>,

    #[garde(length(max = 255))]
    pub icon_filename: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    pub message: String,
    pub apk_info: ApkInfo,
}

/// Metadata for a generated artifact, including its retrieval reference.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApkInfo {
    pub id: Uuid,
    pub filename: String,
    pub app_name: String,
    pub package_name: String,
    pub version: String,
    pub size: u64,
    pub features: Vec<FeatureFlag>,
    pub permissions: PermissionTier,
    pub timestamp: DateTime<Utc>,
    pub download_url: String,
}

impl ApkInfo {
    pub fn from_job(job: &Job) -> Self {
        Self {
            id: job.id,
            filename: job.filename.clone(),
            app_name: job.app_name.clone(),
            package_name: job.package_name.clone(),
            version: job.version.clone(),
            size: job.size,
            features: job.features.clone(),
            permissions: job.permissions,
            timestamp: job.created_at,
            download_url: download_url(&job.id.to_string(), &job.filename),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub id: String,
    pub filename: String,
}

/// One entry in the recent-APKs listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApkListEntry {
    pub id: String,
    pub filename: String,
    pub app_name: String,
    pub package_name: String,
    pub version: String,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentApksResponse {
    pub success: bool,
    pub count: usize,
    pub apks: Vec<ApkListEntry>,
}

/// Build the query-style download link for an artifact.
pub fn download_url(id: &str, filename: &str) -> String {
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
    format!(
        "/download?id={}&filename={}",
        id,
        utf8_percent_encode(filename, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_request_accepts_camel_case_fields() {
        let request: ConvertRequest = serde_json::from_str(
            r#"{
                "appName": "My App",
                "packageName": "com.test.app",
                "features": ["splash", "push"],
                "permissions": "full",
                "htmlFilename": "abc.html"
            }"#,
        )
        .unwrap();

        assert_eq!(request.app_name.as_deref(), Some("My App"));
        assert_eq!(request.permissions, Some(PermissionTier::Full));
        assert_eq!(
            request.features,
            Some(vec![FeatureFlag::Splash, FeatureFlag::Push])
        );
        assert!(request.version.is_none());
    }

    #[test]
    fn download_url_percent_encodes_filename() {
        let url = download_url("abc123", "My App 1.0.apk");
        assert_eq!(url, "/download?id=abc123&filename=My%20App%201%2E0%2Eapk");
    }
}
