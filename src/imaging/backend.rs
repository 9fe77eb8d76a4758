//! Image backend trait and the per-file error taxonomy.
//!
//! The [`ImageBackend`] trait defines the two operations the rest of the
//! crate needs from pixels: identify (read dimensions) and resize in place.
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests use a recording
//! mock so batch logic runs without decoding anything.

use super::params::ResizeParams;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can go wrong with a single file.
///
/// None of these is fatal to a batch: the worker records the failure and
/// moves on to the next file.
#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("unsupported format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("already in the list: {}", .0.display())]
    DuplicateSkipped(PathBuf),
    #[error("failed to decode {}: {message}", .path.display())]
    DecodeError { path: PathBuf, message: String },
    #[error("failed to encode {}: {message}", .path.display())]
    EncodeError { path: PathBuf, message: String },
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("invalid image dimensions {width}x{height}")]
    InvalidImage { width: u32, height: u32 },
    #[error("IO error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl ResizeError {
    /// Map an I/O error onto the taxonomy, keeping the offending path.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ResizeError::FileNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ResizeError::PermissionDenied(path.to_path_buf()),
            _ => ResizeError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ResizeError::FileNotFound(_) => FailureKind::FileNotFound,
            ResizeError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            ResizeError::DuplicateSkipped(_) => FailureKind::DuplicateSkipped,
            ResizeError::DecodeError { .. } => FailureKind::DecodeError,
            ResizeError::EncodeError { .. } => FailureKind::EncodeError,
            ResizeError::PermissionDenied(_) => FailureKind::PermissionDenied,
            ResizeError::InvalidImage { .. } => FailureKind::InvalidImage,
            ResizeError::Io { .. } => FailureKind::Io,
        }
    }
}

/// Cloneable discriminant of [`ResizeError`] for events and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    FileNotFound,
    UnsupportedFormat,
    DuplicateSkipped,
    DecodeError,
    EncodeError,
    PermissionDenied,
    InvalidImage,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::FileNotFound => "file not found",
            FailureKind::UnsupportedFormat => "unsupported format",
            FailureKind::DuplicateSkipped => "duplicate",
            FailureKind::DecodeError => "decode error",
            FailureKind::EncodeError => "encode error",
            FailureKind::PermissionDenied => "permission denied",
            FailureKind::InvalidImage => "invalid image",
            FailureKind::Io => "I/O error",
        };
        f.write_str(label)
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image backends.
pub trait ImageBackend: Sync {
    /// Read image dimensions without a full decode where the format allows.
    fn identify(&self, path: &Path) -> Result<Dimensions, ResizeError>;

    /// Resize the file at `params.path` and overwrite it.
    ///
    /// Returns the number of bytes written. The original is left untouched
    /// when decoding or encoding fails.
    fn resize_in_place(&self, params: &ResizeParams) -> Result<u64, ResizeError>;
}
