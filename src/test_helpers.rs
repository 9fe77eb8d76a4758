//! Shared test utilities.
//!
//! Synthetic images are generated on the fly so tests never depend on
//! fixture files. Everything writes into a caller-owned directory,
//! normally a `TempDir`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let photo = tmp.path().join("photo.jpg");
//! write_test_jpeg(&photo, 400, 300);
//! let broken = tmp.path().join("broken.png");
//! write_corrupt(&broken);
//! ```

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a JPEG with a simple gradient so the encoder has something to do.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Write a fully opaque RGBA image; the format follows the extension.
pub fn write_test_rgba(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, 64, (y % 256) as u8, 255])
    });
    DynamicImage::ImageRgba8(img).save(path).unwrap();
}

/// Write a file no decoder will accept.
///
/// Long enough that decoders fail on content rather than hitting EOF.
pub fn write_corrupt(path: &Path) {
    let text = "this is not an image, just some plain text pretending to be one. ".repeat(64);
    std::fs::write(path, text).unwrap();
}

// =========================================================================
// Plain files
// =========================================================================

/// Create an empty file named `name` inside `dir`.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}

/// Cut a file down to its first `keep` bytes, like an interrupted download.
pub fn truncate_file(path: &Path, keep: usize) {
    let bytes = std::fs::read(path).unwrap();
    std::fs::write(path, &bytes[..keep.min(bytes.len())]).unwrap();
}
