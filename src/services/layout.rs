use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::services::validation::UploadRole;

/// Owner of the on-disk hierarchy under the configured storage root.
///
/// Layout:
/// ```text
/// <root>/uploads/html/<uuid>.<ext>   transient bundle uploads
/// <root>/uploads/icons/<uuid>.<ext>  transient icon uploads
/// <root>/apks/<jobId>/               one directory per conversion
/// ```
///
/// The root is passed in at construction; nothing here reads ambient process
/// state or creates directories as a side effect of module load.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the full directory layout. Idempotent; invoked once at startup.
    pub async fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [
            self.upload_dir(UploadRole::Bundle),
            self.upload_dir(UploadRole::Icon),
            self.apks_dir(),
        ] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Role-specific directory for transient uploads.
    pub fn upload_dir(&self, role: UploadRole) -> PathBuf {
        let subdir = match role {
            UploadRole::Bundle => "html",
            UploadRole::Icon => "icons",
        };
        self.root.join("uploads").join(subdir)
    }

    /// Path of a stored upload, by its generated filename.
    pub fn upload_path(&self, role: UploadRole, stored_name: &str) -> PathBuf {
        self.upload_dir(role).join(stored_name)
    }

    /// Root of all per-job output directories.
    pub fn apks_dir(&self) -> PathBuf {
        self.root.join("apks")
    }

    /// Output directory exclusively owned by one job.
    pub fn job_dir(&self, job_id: Uuid) -> PathBuf {
        self.apks_dir().join(job_id.to_string())
    }

    /// Generate a collision-free stored filename preserving only the
    /// lower-cased extension of the caller-supplied name.
    pub fn stored_name(original_name: &str) -> String {
        let id = Uuid::new_v4();
        match sanitized_extension(original_name) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        }
    }
}

/// Lower-cased extension of a filename, stripped to ASCII alphanumerics.
///
/// Returns `None` when there is no usable extension. The result is safe to
/// embed in a path: it cannot contain separators or dot segments.
pub fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    let clean: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect();
    if clean.is_empty() {
        None
    } else {
        Some(clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_dirs_are_split_by_role() {
        let layout = StorageLayout::new("/tmp/x");
        assert_eq!(
            layout.upload_dir(UploadRole::Bundle),
            PathBuf::from("/tmp/x/uploads/html")
        );
        assert_eq!(
            layout.upload_dir(UploadRole::Icon),
            PathBuf::from("/tmp/x/uploads/icons")
        );
    }

    #[test]
    fn stored_name_keeps_only_lowercased_extension() {
        let name = StorageLayout::stored_name("My Page.HTML");
        assert!(name.ends_with(".html"));
        assert!(!name.contains(' '));

        let no_ext = StorageLayout::stored_name("README");
        assert!(!no_ext.contains('.'));
    }

    #[test]
    fn sanitized_extension_strips_hostile_input() {
        assert_eq!(sanitized_extension("a.ZIP"), Some("zip".to_string()));
        assert_eq!(sanitized_extension("evil.../../zip"), None);
        assert_eq!(sanitized_extension("noext"), None);
        assert_eq!(sanitized_extension("trailingdot."), None);
    }

    #[tokio::test]
    async fn ensure_layout_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path().join("store"));

        layout.ensure_layout().await.unwrap();
        layout.ensure_layout().await.unwrap();

        assert!(layout.upload_dir(UploadRole::Bundle).is_dir());
        assert!(layout.upload_dir(UploadRole::Icon).is_dir());
        assert!(layout.apks_dir().is_dir());
    }
}
