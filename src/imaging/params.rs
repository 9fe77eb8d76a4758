//! Parameter types for resize operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the pure [`calculations`](super::calculations), the high-level
//! [`operations`](super::operations) and the [`backend`](super::backend) that
//! touches pixels.
//!
//! ## Types
//!
//! - [`ResizeRequest`]: scale factor or target box, validated on construction.
//! - [`ScaleFactor`]: uniform ratio in `[0.1, 3.0]`.
//! - [`TargetBox`]: pixel bounds the content is fitted into, letterboxed.
//! - [`Quality`]: JPEG quality (1–100, default 95). Clamped on construction.
//! - [`Filter`]: resampling filter, Lanczos3 unless asked otherwise.
//! - [`ImageDescriptor`]: what we know about a file before touching it.
//! - [`ResizeParams`]: everything the backend needs to rewrite one file.

use super::backend::Dimensions;
use super::calculations::Geometry;
use image::imageops::FilterType;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Smallest accepted scale factor.
pub const MIN_SCALE: f64 = 0.1;
/// Largest accepted scale factor.
pub const MAX_SCALE: f64 = 3.0;

/// Target boxes offered by the shell, largest first.
pub const TARGET_PRESETS: &[(u32, u32)] = &[
    (4096, 4096),
    (2048, 2048),
    (1024, 1024),
    (512, 512),
    (256, 256),
    (128, 128),
    (64, 64),
    (32, 32),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("scale factor {0} is outside {MIN_SCALE}..={MAX_SCALE}")]
    ScaleOutOfRange(f64),
    #[error("target box must be non-zero, got {0}x{1}")]
    EmptyBox(u32, u32),
    #[error("malformed target size '{0}', expected WIDTHxHEIGHT")]
    Malformed(String),
    #[error("'{0}' is not one of the target presets")]
    NotAPreset(String),
}

/// Uniform resize ratio applied to both edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(factor: f64) -> Result<Self, RequestError> {
        if !factor.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&factor) {
            return Err(RequestError::ScaleOutOfRange(factor));
        }
        Ok(Self(factor))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Pixel bounds the resized content must fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TargetBox {
    width: u32,
    height: u32,
}

impl TargetBox {
    pub fn new(width: u32, height: u32) -> Result<Self, RequestError> {
        if width == 0 || height == 0 {
            return Err(RequestError::EmptyBox(width, height));
        }
        Ok(Self { width, height })
    }

    /// Parse `WIDTHxHEIGHT` and require it to be one of [`TARGET_PRESETS`].
    pub fn preset(text: &str) -> Result<Self, RequestError> {
        let target: Self = text.parse()?;
        if target.is_preset() {
            Ok(target)
        } else {
            Err(RequestError::NotAPreset(text.trim().to_string()))
        }
    }

    /// All preset boxes, largest first.
    pub fn presets() -> impl Iterator<Item = TargetBox> {
        TARGET_PRESETS
            .iter()
            .map(|&(width, height)| TargetBox { width, height })
    }

    pub fn is_preset(&self) -> bool {
        TARGET_PRESETS.contains(&(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl FromStr for TargetBox {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (w, h) = trimmed
            .split_once(['x', 'X'])
            .ok_or_else(|| RequestError::Malformed(trimmed.to_string()))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| RequestError::Malformed(trimmed.to_string()))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| RequestError::Malformed(trimmed.to_string()))?;
        Self::new(width, height)
    }
}

impl fmt::Display for TargetBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How a batch should resize every image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeRequest {
    /// Multiply both edges by the same ratio.
    ScaleFactor(ScaleFactor),
    /// Fit inside a box, keep the aspect ratio, pad with transparency.
    TargetBox(TargetBox),
}

impl ResizeRequest {
    pub fn scale(factor: f64) -> Result<Self, RequestError> {
        ScaleFactor::new(factor).map(Self::ScaleFactor)
    }

    pub fn target(width: u32, height: u32) -> Result<Self, RequestError> {
        TargetBox::new(width, height).map(Self::TargetBox)
    }
}

impl fmt::Display for ResizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeRequest::ScaleFactor(s) => write!(f, "scale {:.2}", s.value()),
            ResizeRequest::TargetBox(t) => write!(f, "target {}", t),
        }
    }
}

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Resampling filter used for the content resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<Filter> for FilterType {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// A file as found on disk, before any resize.
///
/// Never cached: callers re-read it when they need fresh numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDescriptor {
    pub path: PathBuf,
    pub dimensions: Dimensions,
    pub file_size: u64,
}

/// Parameters for rewriting one file in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub path: PathBuf,
    pub geometry: Geometry,
    pub quality: Quality,
    pub filter: Filter,
}
