use std::path::{Path, PathBuf};

use crate::config::Limits;
use crate::error::LoadError;

/// An image that passed the size and dimension checks, ready to be packed.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl LoadedFile {
    /// Size of the encoded image in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read an image from disk and check it against `limits`.
///
/// The checks run in order: stat, file size, read, decode, dimensions. The
/// first one that fails decides the [`LoadError`] variant.
///
/// # Example
///
/// ```rust,no_run
/// use labelbatch::config::Limits;
/// use labelbatch::loader::load;
///
/// let file = load("photo.jpg".as_ref(), &Limits::default()).unwrap();
/// println!("{}x{}", file.width, file.height);
/// ```
pub fn load(path: &Path, limits: &Limits) -> Result<LoadedFile, LoadError> {
    let stat = std::fs::metadata(path).map_err(|source| LoadError::StatFailed {
        path: path.to_path_buf(),
        source,
    })?;

    if stat.len() > limits.max_file_bytes {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size_mb: stat.len() as f64 / (1 << 20) as f64,
            max_mb: limits.max_file_bytes as f64 / (1 << 20) as f64,
        });
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let img = image::load_from_memory(&bytes).map_err(|source| LoadError::DecodeFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = (img.width(), img.height());

    if limits.is_too_small(width, height) {
        return Err(LoadError::TooSmall {
            path: path.to_path_buf(),
            width,
            height,
            min_width: limits.min_width,
            min_height: limits.min_height,
        });
    }

    log::info!(
        "{} is {} bytes and {}x{} pixels",
        path.display(),
        bytes.len(),
        width,
        height
    );

    Ok(LoadedFile {
        path: path.to_path_buf(),
        bytes,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DimensionCheck;
    use image::RgbImage;
    use std::fs;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn loads_image_at_minimum_size() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "ok.png", 640, 480);

        let file = load(&path, &Limits::default()).unwrap();
        assert_eq!((file.width, file.height), (640, 480));
        assert_eq!(file.path, path);
        assert_eq!(file.len(), fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn missing_file_is_stat_failure() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("nope.png"), &Limits::default()).unwrap_err();
        assert!(matches!(err, LoadError::StatFailed { .. }));
    }

    #[test]
    fn oversized_file_rejected_before_reading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.png");
        fs::write(&path, vec![0u8; (4 << 20) + 1]).unwrap();

        let err = load(&path, &Limits::default()).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { .. }));
    }

    #[test]
    fn file_at_exact_limit_is_not_too_large() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edge.png");
        fs::write(&path, vec![0u8; 4 << 20]).unwrap();

        // Passes the size gate, then fails to decode.
        let err = load(&path, &Limits::default()).unwrap_err();
        assert!(matches!(err, LoadError::DecodeFailed { .. }));
    }

    #[test]
    fn directory_is_read_failure() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("folder.png");
        fs::create_dir(&sub).unwrap();

        let err = load(&sub, &Limits::default()).unwrap_err();
        assert!(matches!(err, LoadError::ReadFailed { .. }));
    }

    #[test]
    fn garbage_is_decode_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("text.jpg");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = load(&path, &Limits::default()).unwrap_err();
        assert!(matches!(err, LoadError::DecodeFailed { .. }));
        assert_eq!(err.path(), &path);
    }

    #[test]
    fn small_image_is_too_small() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "tiny.png", 100, 100);

        let err = load(&path, &Limits::default()).unwrap_err();
        match err {
            LoadError::TooSmall { width, height, .. } => assert_eq!((width, height), (100, 100)),
            other => panic!("expected TooSmall, got {other:?}"),
        }
    }

    // 700x300 is where the two dimension rules disagree.
    #[test]
    fn short_wide_image_rejected_by_strict_check() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "wide.png", 700, 300);

        let err = load(&path, &Limits::default()).unwrap_err();
        assert!(matches!(err, LoadError::TooSmall { .. }));
    }

    #[test]
    fn short_wide_image_accepted_by_legacy_check() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "wide.png", 700, 300);
        let limits = Limits {
            dimension_check: DimensionCheck::Legacy,
            ..Limits::default()
        };

        let file = load(&path, &limits).unwrap();
        assert_eq!((file.width, file.height), (700, 300));
    }
}
