use crate::error::ApiError;

/// Maximum number of files per upload request (one bundle, one optional icon).
pub const MAX_FILES_PER_REQUEST: usize = 2;

/// Media types accepted for icon uploads.
const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Media types accepted for bundle uploads.
const ALLOWED_BUNDLE_TYPES: &[&str] = &["text/html", "application/zip"];

/// Filename extensions accepted for bundle uploads (lower-cased).
const ALLOWED_BUNDLE_EXTS: &[&str] = &["html", "htm", "zip"];

/// The role a submitted file plays in a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRole {
    Bundle,
    Icon,
}

/// Validate a submission's declared media type and original filename for a role.
///
/// Icons are accepted on media type alone. Bundles are accepted when either the
/// media type or the filename extension matches the allow-list, since browsers
/// routinely misreport HTML and ZIP types.
pub fn validate_submission(
    role: UploadRole,
    declared_type: &str,
    original_name: &str,
) -> Result<(), ApiError> {
    match role {
        UploadRole::Icon => {
            if ALLOWED_IMAGE_TYPES.contains(&declared_type) {
                Ok(())
            } else {
                Err(ApiError::UnsupportedMediaType(format!(
                    "Only image files are allowed for the icon (JPEG, PNG, GIF, WebP), got '{declared_type}'"
                )))
            }
        }
        UploadRole::Bundle => {
            let ext = crate::services::layout::sanitized_extension(original_name);
            let ext_ok = ext
                .as_deref()
                .is_some_and(|e| ALLOWED_BUNDLE_EXTS.contains(&e));
            if ALLOWED_BUNDLE_TYPES.contains(&declared_type) || ext_ok {
                Ok(())
            } else {
                Err(ApiError::UnsupportedMediaType(
                    "Only HTML or ZIP files are allowed".to_string(),
                ))
            }
        }
    }
}

/// Enforce the per-file size cap.
pub fn check_size(size: u64, max_bytes: u64) -> Result<(), ApiError> {
    if size > max_bytes {
        Err(ApiError::PayloadTooLarge(max_bytes))
    } else {
        Ok(())
    }
}

/// Enforce the per-request file count cap.
pub fn check_file_count(count: usize) -> Result<(), ApiError> {
    if count > MAX_FILES_PER_REQUEST {
        Err(ApiError::TooManyFiles(MAX_FILES_PER_REQUEST))
    } else {
        Ok(())
    }
}

/// Reject anything that is not a plain single path component.
///
/// Caller-supplied names may only ever be used as one component of a path
/// under the storage root; separators and dot segments would allow traversal.
pub fn is_safe_path_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
