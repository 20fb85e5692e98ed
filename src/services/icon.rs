use image::imageops::FilterType;
use image::{ImageFormat, ImageReader, RgbaImage};
use std::path::{Path, PathBuf};

/// Canonical icon edge length in pixels.
pub const ICON_SIZE: u32 = 512;

/// Prefix applied to the normalized rendition's stored name.
const RESIZED_PREFIX: &str = "resized-";

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Icon file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Produce the fixed-size canonical PNG rendition of an accepted icon.
///
/// The source is scaled with a "contain" fit (aspect preserved, centered on a
/// fully transparent 512x512 canvas) and encoded as PNG next to the source as
/// `resized-<stem>.png`. On success the original file is deleted and only the
/// rendition remains.
///
/// Decoding and encoding are CPU-bound; callers run this on the blocking pool.
pub fn normalize(source: &Path) -> Result<PathBuf, IconError> {
    let decoded = ImageReader::open(source)?.with_guessed_format()?.decode()?;

    // resize() fits within the bounds while preserving aspect ratio.
    let scaled = decoded
        .resize(ICON_SIZE, ICON_SIZE, FilterType::Lanczos3)
        .to_rgba8();

    let mut canvas = RgbaImage::new(ICON_SIZE, ICON_SIZE);
    let x = i64::from((ICON_SIZE - scaled.width()) / 2);
    let y = i64::from((ICON_SIZE - scaled.height()) / 2);
    image::imageops::overlay(&mut canvas, &scaled, x, y);

    let dest = normalized_path(source);
    canvas.save_with_format(&dest, ImageFormat::Png)?;

    std::fs::remove_file(source)?;

    Ok(dest)
}

/// Destination path for a source icon's normalized rendition.
fn normalized_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("icon");
    source.with_file_name(format!("{RESIZED_PREFIX}{stem}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let mut img = RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([200, 40, 40]);
        }
        let path = dir.join(name);
        img.save_with_format(&path, ImageFormat::Jpeg).unwrap();
        path
    }

    #[test]
    fn wide_image_becomes_512_square_png() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_test_image(tmp.path(), "icon.jpg", 1024, 256);

        let dest = normalize(&source).unwrap();

        assert_eq!(dest.file_name().unwrap(), "resized-icon.png");
        let out = ImageReader::open(&dest)
            .unwrap()
            .with_guessed_format()
            .unwrap();
        assert_eq!(out.format(), Some(ImageFormat::Png));
        let decoded = out.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (ICON_SIZE, ICON_SIZE));

        // Padding rows above and below the scaled content are transparent.
        let rgba = decoded.to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0)[3], 0);
        assert_eq!(rgba.get_pixel(ICON_SIZE / 2, ICON_SIZE - 1)[3], 0);
        // The center carries the source content, fully opaque.
        assert_eq!(rgba.get_pixel(ICON_SIZE / 2, ICON_SIZE / 2)[3], 255);
    }

    #[test]
    fn tall_image_becomes_512_square_png() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_test_image(tmp.path(), "tall.jpg", 100, 400);

        let dest = normalize(&source).unwrap();
        let decoded = image::open(&dest).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (ICON_SIZE, ICON_SIZE));
    }

    #[test]
    fn original_is_deleted_on_success() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_test_image(tmp.path(), "icon.jpg", 64, 64);

        normalize(&source).unwrap();

        assert!(!source.exists());
    }

    #[test]
    fn corrupt_input_fails_without_touching_original() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("broken.png");
        std::fs::write(&source, b"not an image at all").unwrap();

        let err = normalize(&source).unwrap_err();
        assert!(matches!(err, IconError::Image(_)));
        assert!(source.exists());
    }
}
