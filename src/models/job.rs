use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Optional features baked into a generated package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FeatureFlag {
    Splash,
    Fullscreen,
    AdIntegration,
    Push,
}

/// Android permission tier requested for a generated package.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PermissionTier {
    Minimal,
    #[default]
    Standard,
    Full,
}

/// One conversion's persisted identity and metadata.
///
/// Created once by the persister at conversion time and immutable thereafter.
/// Cleanup relies on the temporary storage area expiring, not on this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub app_name: String,
    pub package_name: String,
    pub version: String,
    pub features: Vec<FeatureFlag>,
    pub permissions: PermissionTier,
    pub filename: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// On-disk metadata record written next to each artifact as `manifest.json`.
///
/// A job directory holds at most one manifest, and the recorded filename must
/// match a sibling file for the entry to be listable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub app_name: String,
    pub package_name: String,
    pub version: String,
    #[serde(default)]
    pub features: Vec<FeatureFlag>,
    #[serde(default)]
    pub permissions: PermissionTier,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

impl Manifest {
    pub fn for_job(job: &Job) -> Self {
        Self {
            app_name: job.app_name.clone(),
            package_name: job.package_name.clone(),
            version: job.version.clone(),
            features: job.features.clone(),
            permissions: job.permissions,
            filename: job.filename.clone(),
            created_at: job.created_at,
        }
    }
}
