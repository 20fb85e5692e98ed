use chrono::{DateTime, Utc};
use std::path::Path;

use crate::error::ApiResult;
use crate::models::api::{download_url, ApkListEntry};
use crate::models::job::Manifest;
use crate::services::layout::StorageLayout;

/// Maximum number of entries returned by a listing.
pub const RECENT_LIMIT: usize = 5;

/// Artifact extension scanned for inside job directories.
const ARTIFACT_EXT: &str = ".apk";

/// Enumerate per-job output directories and return the most recent artifacts.
///
/// One entry is emitted per `.apk` file found. A missing or malformed manifest
/// degrades that entry to placeholder metadata; it never aborts the scan.
/// Entries are sorted by creation time descending and capped at [`RECENT_LIMIT`].
pub async fn recent_jobs(layout: &StorageLayout) -> ApiResult<Vec<ApkListEntry>> {
    let apks_dir = layout.apks_dir();
    let mut entries = Vec::new();

    let mut dirs = match tokio::fs::read_dir(&apks_dir).await {
        Ok(dirs) => dirs,
        // No output root yet means nothing has been converted.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
        Err(e) => return Err(e.into()),
    };

    while let Some(dir) = dirs.next_entry().await? {
        if !dir.file_type().await?.is_dir() {
            continue;
        }
        let job_id = dir.file_name().to_string_lossy().into_owned();

        match scan_job_dir(&dir.path(), &job_id).await {
            Ok(mut found) => entries.append(&mut found),
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Skipping unreadable job directory");
            }
        }
    }

    entries.sort_by(|a, b| b.created.cmp(&a.created));
    entries.truncate(RECENT_LIMIT);
    Ok(entries)
}

async fn scan_job_dir(dir: &Path, job_id: &str) -> std::io::Result<Vec<ApkListEntry>> {
    let manifest = read_manifest(dir).await;
    let mut found = Vec::new();

    let mut files = tokio::fs::read_dir(dir).await?;
    while let Some(file) = files.next_entry().await? {
        let name = file.file_name().to_string_lossy().into_owned();
        if !name.ends_with(ARTIFACT_EXT) {
            continue;
        }

        let meta = file.metadata().await?;
        let created = manifest
            .as_ref()
            .map(|m| m.created_at)
            .unwrap_or_else(|| fs_time(&meta));

        let (app_name, package_name, version) = match &manifest {
            Some(m) => (m.app_name.clone(), m.package_name.clone(), m.version.clone()),
            None => (
                "Unknown App".to_string(),
                "com.unknown.app".to_string(),
                "1.0.0".to_string(),
            ),
        };

        found.push(ApkListEntry {
            id: job_id.to_string(),
            download_url: download_url(job_id, &name),
            filename: name,
            app_name,
            package_name,
            version,
            size: meta.len(),
            created,
        });
    }

    Ok(found)
}

/// Read and parse a job directory's manifest, treating any failure as absent.
async fn read_manifest(dir: &Path) -> Option<Manifest> {
    let bytes = tokio::fs::read(dir.join("manifest.json")).await.ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Malformed manifest, using placeholders");
            None
        }
    }
}

fn fs_time(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.created()
        .or_else(|_| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn write_job(
        layout: &StorageLayout,
        id: &str,
        filename: &str,
        manifest: Option<&Manifest>,
    ) {
        let dir = layout.apks_dir().join(id);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(filename), b"artifact bytes")
            .await
            .unwrap();
        if let Some(m) = manifest {
            tokio::fs::write(
                dir.join("manifest.json"),
                serde_json::to_vec(m).unwrap(),
            )
            .await
            .unwrap();
        }
    }

    fn manifest(app_name: &str, filename: &str, created_at: DateTime<Utc>) -> Manifest {
        Manifest {
            app_name: app_name.to_string(),
            package_name: format!("com.test.{}", app_name.to_lowercase()),
            version: "1.0.0".to_string(),
            features: Vec::new(),
            permissions: Default::default(),
            filename: filename.to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn empty_or_missing_root_lists_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path());

        // apks/ does not exist yet
        assert!(recent_jobs(&layout).await.unwrap().is_empty());

        layout.ensure_layout().await.unwrap();
        assert!(recent_jobs(&layout).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_newest_first_and_caps_at_five() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path());
        layout.ensure_layout().await.unwrap();

        for i in 0..7u32 {
            let created = Utc.with_ymd_and_hms(2026, 1, 1 + i, 12, 0, 0).unwrap();
            let filename = format!("App{i}_1.0.0.apk");
            write_job(
                &layout,
                &format!("job-{i}"),
                &filename,
                Some(&manifest(&format!("App{i}"), &filename, created)),
            )
            .await;
        }

        let entries = recent_jobs(&layout).await.unwrap();
        assert_eq!(entries.len(), RECENT_LIMIT);
        assert_eq!(entries[0].app_name, "App6");
        assert_eq!(entries[4].app_name, "App2");
        for window in entries.windows(2) {
            assert!(window[0].created >= window[1].created);
        }
    }

    #[tokio::test]
    async fn missing_manifest_degrades_to_placeholders() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path());
        layout.ensure_layout().await.unwrap();

        write_job(&layout, "orphan", "Mystery_1.0.0.apk", None).await;

        let entries = recent_jobs(&layout).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].app_name, "Unknown App");
        assert_eq!(entries[0].package_name, "com.unknown.app");
        assert_eq!(entries[0].version, "1.0.0");
        assert_eq!(entries[0].filename, "Mystery_1.0.0.apk");
        assert_eq!(entries[0].size, "artifact bytes".len() as u64);
    }

    #[tokio::test]
    async fn corrupt_manifest_does_not_abort_scan() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path());
        layout.ensure_layout().await.unwrap();

        let created = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        write_job(
            &layout,
            "good",
            "Good_1.0.0.apk",
            Some(&manifest("Good", "Good_1.0.0.apk", created)),
        )
        .await;

        let bad_dir = layout.apks_dir().join("bad");
        tokio::fs::create_dir_all(&bad_dir).await.unwrap();
        tokio::fs::write(bad_dir.join("Bad_1.0.0.apk"), b"x").await.unwrap();
        tokio::fs::write(bad_dir.join("manifest.json"), b"{ not json")
            .await
            .unwrap();

        let entries = recent_jobs(&layout).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.app_name == "Good"));
        assert!(entries.iter().any(|e| e.app_name == "Unknown App"));
    }

    #[tokio::test]
    async fn non_artifact_files_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path());
        layout.ensure_layout().await.unwrap();

        let dir = layout.apks_dir().join("job-x");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("manifest.json"), b"{}").await.unwrap();
        tokio::fs::write(dir.join("icon.png"), b"png").await.unwrap();

        assert!(recent_jobs(&layout).await.unwrap().is_empty());
    }
}
