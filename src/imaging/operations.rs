//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They read
//! what they need from disk, compute parameters, and call the backend.

use super::backend::{ImageBackend, ResizeError};
use super::calculations::{Geometry, compute, estimate_bytes};
use super::params::{Filter, ImageDescriptor, Quality, ResizeParams, ResizeRequest};
use serde::Serialize;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ResizeError>;

/// Computed outcome of a resize, before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResizeResult {
    pub geometry: Geometry,
    /// Area-ratio estimate of the output size; see [`estimate_bytes`].
    pub estimated_bytes: u64,
}

/// What happened to one file after it was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub descriptor: ImageDescriptor,
    pub result: ResizeResult,
    pub new_size: u64,
}

/// Read file size and dimensions. Always hits the disk.
pub fn describe(backend: &impl ImageBackend, path: &Path) -> Result<ImageDescriptor> {
    let metadata = std::fs::metadata(path).map_err(|e| ResizeError::from_io(path, e))?;
    if !metadata.is_file() {
        return Err(ResizeError::UnsupportedFormat(path.to_path_buf()));
    }
    let dimensions = backend.identify(path)?;
    Ok(ImageDescriptor {
        path: path.to_path_buf(),
        dimensions,
        file_size: metadata.len(),
    })
}

/// Plan a resize without executing it.
pub fn plan(descriptor: &ImageDescriptor, request: &ResizeRequest) -> Result<ResizeResult> {
    let dims = descriptor.dimensions;
    let geometry = compute(dims.width, dims.height, request)?;
    Ok(ResizeResult {
        geometry,
        estimated_bytes: estimate_bytes(
            descriptor.file_size,
            (dims.width, dims.height),
            (geometry.width, geometry.height),
        ),
    })
}

/// Describe and plan in one go, for previews.
pub fn preview(
    backend: &impl ImageBackend,
    path: &Path,
    request: &ResizeRequest,
) -> Result<(ImageDescriptor, ResizeResult)> {
    let descriptor = describe(backend, path)?;
    let result = plan(&descriptor, request)?;
    Ok((descriptor, result))
}

/// Rewrite one file according to a computed result. Destructive.
///
/// Returns the new file size in bytes.
pub fn apply(
    backend: &impl ImageBackend,
    path: &Path,
    result: &ResizeResult,
    quality: Quality,
    filter: Filter,
) -> Result<u64> {
    backend.resize_in_place(&ResizeParams {
        path: path.to_path_buf(),
        geometry: result.geometry,
        quality,
        filter,
    })
}

/// Describe, plan and apply a single file.
pub fn resize_file(
    backend: &impl ImageBackend,
    path: &Path,
    request: &ResizeRequest,
    quality: Quality,
    filter: Filter,
) -> Result<FileReport> {
    let (descriptor, result) = preview(backend, path, request)?;
    let new_size = apply(backend, path, &result, quality, filter)?;
    Ok(FileReport {
        descriptor,
        result,
        new_size,
    })
}
