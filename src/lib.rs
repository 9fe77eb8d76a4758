//! # Resize In Place
//!
//! Batch-resizes photos and overwrites the originals. One request applies to
//! the whole batch, in one of two modes:
//!
//! - **Scale factor**: multiply both edges by the same ratio (0.1 to 3.0).
//! - **Target box**: fit inside a preset square, keep the aspect ratio, and
//!   center the result on a transparent canvas of exactly the box size.
//!
//! # Pipeline
//!
//! ```text
//! 1. Collect   paths / folders / drop payload  →  FileList   (validated, ordered)
//! 2. Preview   FileList + request              →  plans      (nothing written)
//! 3. Apply     FileList + BatchConfig          →  files overwritten + BatchSummary
//! ```
//!
//! Applying is destructive. There is no backup and no undo; the command line
//! asks for confirmation unless told otherwise.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Collects candidate files: folder walking, drop payload parsing, the validated [`scan::FileList`] |
//! | [`imaging`] | Dimension math, size estimates, and the `image`-crate backend that rewrites files |
//! | [`process`] | Runs a batch sequentially on a worker thread and reports progress events |
//! | [`config`] | [`config::BatchConfig`]: the validated, read-only settings for one batch |
//! | [`output`] | CLI output formatting for presets, previews, progress and the summary |
//!
//! # Design Decisions
//!
//! ## Per-File Failure Isolation
//!
//! A batch never aborts. Every file either succeeds or is recorded with a
//! [`imaging::FailureKind`], and a failed file is never partially written:
//! the new image is fully encoded in memory, written to a temp file beside
//! the original, and renamed over it.
//!
//! ## Output Format Follows the Extension
//!
//! The file keeps its name, so it keeps the format its extension promises.
//! A PNG named `.jpg` comes back as a real JPEG. JPEG output is always quality
//! 95; alpha is dropped for formats that cannot carry it.
//!
//! ## Sequential Worker
//!
//! Files are resized one at a time, in the order they were added, on a single
//! background thread. Progress events arrive in order with a strictly
//! increasing completed count, which keeps the display honest and memory use
//! bounded to one decoded image.

pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
