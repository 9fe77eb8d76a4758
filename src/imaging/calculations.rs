//! Pure calculation functions for resize geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::ResizeError;
use super::params::{ResizeRequest, TargetBox};
use serde::Serialize;

/// Where resized content lands on a letterbox canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Left edge of the content on the canvas.
    pub x: u32,
    /// Top edge of the content on the canvas.
    pub y: u32,
}

/// Output of [`compute`]: content size plus optional letterbox placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    /// Resized content width.
    pub width: u32,
    /// Resized content height.
    pub height: u32,
    /// Present in target box mode only.
    pub placement: Option<Placement>,
}

impl Geometry {
    /// Size of the image that ends up on disk.
    pub fn canvas(&self) -> (u32, u32) {
        match self.placement {
            Some(p) => (p.canvas_width, p.canvas_height),
            None => (self.width, self.height),
        }
    }
}

/// Compute the resized content size and letterbox placement.
///
/// # Arguments
/// * `original_w`, `original_h` - Source image dimensions
/// * `request` - Scale factor or target box
///
/// # Errors
/// [`ResizeError::InvalidImage`] if either source dimension is zero.
///
/// # Examples
/// ```
/// # use resize_in_place::imaging::{compute, ResizeRequest};
/// let g = compute(4000, 2000, &ResizeRequest::target(1024, 1024).unwrap()).unwrap();
/// assert_eq!((g.width, g.height), (1024, 512));
/// let p = g.placement.unwrap();
/// assert_eq!((p.x, p.y), (0, 256));
/// ```
pub fn compute(
    original_w: u32,
    original_h: u32,
    request: &ResizeRequest,
) -> Result<Geometry, ResizeError> {
    if original_w == 0 || original_h == 0 {
        return Err(ResizeError::InvalidImage {
            width: original_w,
            height: original_h,
        });
    }

    Ok(match request {
        ResizeRequest::ScaleFactor(scale) => {
            let f = scale.value();
            Geometry {
                width: round_edge(original_w as f64 * f),
                height: round_edge(original_h as f64 * f),
                placement: None,
            }
        }
        ResizeRequest::TargetBox(target) => fit_into_box((original_w, original_h), *target),
    })
}

/// Landscape sources pin the width to the box, everything else pins the
/// height. If the pinned axis would push the other one past the box (only
/// possible with non-square boxes) the other axis is pinned instead.
fn fit_into_box(original: (u32, u32), target: TargetBox) -> Geometry {
    let (tgt_w, tgt_h) = (target.width(), target.height());
    let ratio = original.0 as f64 / original.1 as f64;

    let width_pinned = (tgt_w, round_edge(tgt_w as f64 / ratio));
    let height_pinned = (round_edge(tgt_h as f64 * ratio), tgt_h);

    let (width, height) = if ratio > 1.0 {
        if width_pinned.1 <= tgt_h {
            width_pinned
        } else {
            height_pinned
        }
    } else if height_pinned.0 <= tgt_w {
        height_pinned
    } else {
        width_pinned
    };

    Geometry {
        width,
        height,
        placement: Some(Placement {
            canvas_width: tgt_w,
            canvas_height: tgt_h,
            x: (tgt_w - width) / 2,
            y: (tgt_h - height) / 2,
        }),
    }
}

fn round_edge(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Estimate the encoded size after resizing, by area ratio.
///
/// This is a heuristic. The real size depends on image content, the output
/// format and its encoder settings; treat the result as a ballpark for
/// previews, never as a promise.
pub fn estimate_bytes(original_bytes: u64, original: (u32, u32), resized: (u32, u32)) -> u64 {
    let original_area = original.0 as u128 * original.1 as u128;
    if original_area == 0 {
        return 0;
    }
    let resized_area = resized.0 as u128 * resized.1 as u128;
    let estimate = original_bytes as u128 * resized_area / original_area;
    u64::try_from(estimate).unwrap_or(u64::MAX)
}
