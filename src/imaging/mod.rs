//! Image resizing: pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **Letterbox** | transparent RGBA canvas + `imageops::replace` |
//! | **Encode** | format from extension; JPEG at quality 95 |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and size math (unit testable)
//! - **Parameters**: Requests, descriptors and backend parameters
//! - **Backend**: [`ImageBackend`] trait, error taxonomy, [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, FailureKind, ImageBackend, ResizeError};
pub use calculations::{Geometry, Placement, compute, estimate_bytes};
pub use operations::{FileReport, ResizeResult, describe, plan, preview, resize_file};
pub use params::{
    Filter, ImageDescriptor, MAX_SCALE, MIN_SCALE, Quality, RequestError, ResizeParams,
    ResizeRequest, ScaleFactor, TARGET_PRESETS, TargetBox,
};
pub use rust_backend::{RustBackend, is_supported, supported_extensions};
