#![allow(dead_code)]

use image::RgbImage;
use std::path::{Path, PathBuf};

/// Write a blank PNG of the given size, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    RgbImage::new(width, height).save(path).expect("write png");
    path.to_path_buf()
}

pub fn pattern(dir: &Path, tail: &str) -> String {
    format!("{}/{tail}", dir.display())
}
