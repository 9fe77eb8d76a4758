//! CLI output formatting for every command.
//!
//! # File-First Display
//!
//! Each file leads with its positional index (or batch progress) and file
//! name. Full paths, dimensions and sizes follow as indented context lines.
//! That keeps long batches scannable while still letting users trace every
//! line back to a file on disk.
//!
//! # Output Format
//!
//! ## Presets
//!
//! ```text
//! Scale factor
//!     0.10 to 3.00
//! Target sizes
//!     4096x4096
//!     ...
//!     32x32
//! ```
//!
//! ## Inspect
//!
//! ```text
//! 001 photo.jpg
//!     Source: /home/me/photos/photo.jpg
//!     Original: 4000x2000, 7.6 MB
//!     Target box: 1024x1024
//!     Result: 1024x512, offset (0, 256)
//!     Estimated: 512.0 KB
//!
//! Skipped (1)
//!     unsupported format: /home/me/photos/notes.txt
//! ```
//!
//! ## Apply
//!
//! ```text
//! Resizing 3 files (scale 0.50)
//! [1/3] photo.jpg
//!     2000x1000, 7.6 MB → 1.9 MB (decreased 75.0%)
//! [2/3] broken.png
//!     Failed (decode error): failed to decode broken.png: ...
//! [3/3] icon.gif
//!     50x50, 4.0 KB → 1.5 KB (decreased 62.5%)
//!
//! Resized 2 of 3 files
//!     Total: 7.6 MB → 1.9 MB (decreased 75.0%)
//! Failed 1
//!     decode error: 1
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{
    ImageDescriptor, MAX_SCALE, MIN_SCALE, ResizeError, ResizeRequest, ResizeResult,
    TARGET_PRESETS,
};
use crate::process::{BatchSummary, ProcessEvent};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name for header lines, falling back to the whole path.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Human-readable byte count in 1024 steps, one decimal.
///
/// ```text
/// 512.0 B
/// 1.5 KB
/// 7.6 MB
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

/// Describe a percentage change. Zero reads as a decrease.
pub fn format_change(percent: f64) -> String {
    if percent > 0.0 {
        format!("increased {:.1}%", percent)
    } else {
        format!("decreased {:.1}%", percent.abs())
    }
}

fn size_transition(original: u64, new: u64) -> String {
    let transition = format!("{} → {}", format_size(original), format_size(new));
    if original == 0 {
        return transition;
    }
    let percent = (new as f64 - original as f64) / original as f64 * 100.0;
    format!("{} ({})", transition, format_change(percent))
}

// ============================================================================
// Presets
// ============================================================================

/// Format the choices the command line accepts.
pub fn format_presets() -> Vec<String> {
    let mut lines = vec![
        "Scale factor".to_string(),
        format!("{}{:.2} to {:.2}", indent(1), MIN_SCALE, MAX_SCALE),
        "Target sizes".to_string(),
    ];
    for (w, h) in TARGET_PRESETS {
        lines.push(format!("{}{}x{}", indent(1), w, h));
    }
    lines
}

pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// Format one file, and its plan when a request was given.
///
/// The `Target box` line only appears in target-box mode, matching what the
/// resize actually does.
pub fn format_preview(
    index: usize,
    descriptor: &ImageDescriptor,
    plan: Option<(&ResizeRequest, &ResizeResult)>,
) -> Vec<String> {
    let dims = descriptor.dimensions;
    let mut lines = vec![
        format!("{} {}", format_index(index), file_label(&descriptor.path)),
        format!("{}Source: {}", indent(1), descriptor.path.display()),
        format!(
            "{}Original: {}x{}, {}",
            indent(1),
            dims.width,
            dims.height,
            format_size(descriptor.file_size)
        ),
    ];
    let Some((request, result)) = plan else {
        return lines;
    };
    if let ResizeRequest::TargetBox(target) = request {
        lines.push(format!("{}Target box: {}", indent(1), target));
    }
    let geometry = result.geometry;
    let placement = match geometry.placement {
        Some(p) => format!(", offset ({}, {})", p.x, p.y),
        None => String::new(),
    };
    lines.push(format!(
        "{}Result: {}x{}{}",
        indent(1),
        geometry.width,
        geometry.height,
        placement
    ));
    lines.push(format!(
        "{}Estimated: {}",
        indent(1),
        format_size(result.estimated_bytes)
    ));
    lines
}

/// Format a file that could not be previewed.
pub fn format_preview_error(index: usize, path: &Path, err: &ResizeError) -> Vec<String> {
    vec![
        format!("{} {}", format_index(index), file_label(path)),
        format!("{}Source: {}", indent(1), path.display()),
        format!("{}Error ({}): {}", indent(1), err.kind(), err),
    ]
}

/// Format files refused by the file list. Empty input, empty output.
pub fn format_rejections(rejected: &[ResizeError]) -> Vec<String> {
    if rejected.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Skipped ({})", rejected.len())];
    for err in rejected {
        lines.push(format!("{}{}", indent(1), err));
    }
    lines
}

pub fn print_rejections(rejected: &[ResizeError]) {
    for line in format_rejections(rejected) {
        println!("{}", line);
    }
}

// ============================================================================
// Apply
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent, request: &ResizeRequest) -> Vec<String> {
    match event {
        ProcessEvent::Started { total } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!("Resizing {} {} ({})", total, noun, request)]
        }
        ProcessEvent::FileResized {
            completed,
            total,
            path,
            original_size,
            new_size,
            dimensions,
        } => vec![
            format!("[{}/{}] {}", completed, total, file_label(path)),
            format!(
                "{}{}x{}, {}",
                indent(1),
                dimensions.width,
                dimensions.height,
                size_transition(*original_size, *new_size)
            ),
        ],
        ProcessEvent::FileFailed {
            completed,
            total,
            path,
            kind,
            message,
        } => vec![
            format!("[{}/{}] {}", completed, total, file_label(path)),
            format!("{}Failed ({}): {}", indent(1), kind, message),
        ],
        ProcessEvent::Finished { summary } => {
            let mut lines = vec![String::new()];
            lines.extend(format_summary(summary));
            lines
        }
    }
}

/// Format the end-of-batch report.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Resized {} of {} files",
        summary.succeeded,
        summary.total()
    )];
    if summary.succeeded > 0 {
        let mut total = format!(
            "{}Total: {} → {}",
            indent(1),
            format_size(summary.total_original_bytes),
            format_size(summary.total_new_bytes)
        );
        if let Some(percent) = summary.change_percent() {
            total.push_str(&format!(" ({})", format_change(percent)));
        }
        lines.push(total);
    }
    if summary.has_failures() {
        lines.push(format!("Failed {}", summary.failed_count()));
        for (kind, count) in summary.failures_by_kind() {
            lines.push(format!("{}{}: {}", indent(1), kind, count));
        }
    }
    lines
}

// ============================================================================
// Tests
// ============================================================================
