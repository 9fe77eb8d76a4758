//! Batch processing.
//!
//! Takes the files handed over by [`FileList::into_batch`](crate::scan::FileList::into_batch)
//! and rewrites each one in place, strictly in order, on a single background
//! worker thread.
//!
//! ## Failure handling
//!
//! Every per-file error is recorded and the batch moves on to the next file.
//! A corrupt image in the middle of a folder never stops the rest from being
//! resized, and a file that fails is left as it was on disk.
//!
//! ## Progress
//!
//! The worker reports over an `mpsc` channel:
//!
//! ```text
//! Started { total: 3 }
//! FileResized { completed: 1, .. }
//! FileFailed { completed: 2, kind: DecodeError, .. }
//! FileResized { completed: 3, .. }
//! Finished { summary }
//! ```
//!
//! `completed` counts processed files, successful or not, and increases by
//! exactly one per event. The receiving side can drop the channel at any time;
//! the batch still runs to the end.

use crate::config::BatchConfig;
use crate::imaging::{Dimensions, FailureKind, ImageBackend, resize_file};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("batch worker panicked")]
    WorkerPanicked,
}

/// Progress reported by the batch worker.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        total: usize,
    },
    FileResized {
        completed: usize,
        total: usize,
        path: PathBuf,
        original_size: u64,
        new_size: u64,
        /// Dimensions of the file as written, canvas included.
        dimensions: Dimensions,
    },
    FileFailed {
        completed: usize,
        total: usize,
        path: PathBuf,
        kind: FailureKind,
        message: String,
    },
    Finished {
        summary: BatchSummary,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Aggregate outcome of a batch.
///
/// Byte totals cover successful files only; a failed file is unchanged on
/// disk and does not count towards either side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failures: Vec<FailureRecord>,
    pub total_original_bytes: u64,
    pub total_new_bytes: u64,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Percentage change from original to new total; `None` when nothing
    /// was resized.
    pub fn change_percent(&self) -> Option<f64> {
        if self.total_original_bytes == 0 {
            return None;
        }
        let original = self.total_original_bytes as f64;
        Some((self.total_new_bytes as f64 - original) / original * 100.0)
    }

    fn count_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    /// Failure counts grouped by kind, in first-seen order.
    pub fn failures_by_kind(&self) -> Vec<(FailureKind, usize)> {
        let mut kinds: Vec<FailureKind> = Vec::new();
        for failure in &self.failures {
            if !kinds.contains(&failure.kind) {
                kinds.push(failure.kind);
            }
        }
        kinds.into_iter().map(|k| (k, self.count_of(k))).collect()
    }
}

fn send(progress: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = progress {
        // A closed receiver only means nobody is watching
        let _ = tx.send(event);
    }
}

/// Resize every file in order on the current thread.
pub fn process_batch(
    backend: &impl ImageBackend,
    files: &[PathBuf],
    config: &BatchConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> BatchSummary {
    let total = files.len();
    tracing::info!(total, request = %config.request, "batch started");
    send(&progress, ProcessEvent::Started { total });

    let mut summary = BatchSummary::default();
    for (index, path) in files.iter().enumerate() {
        let completed = index + 1;
        tracing::debug!(path = %path.display(), completed, total, "resizing");

        match resize_file(
            backend,
            path,
            &config.request,
            config.jpeg_quality,
            config.filter,
        ) {
            Ok(report) => {
                let (width, height) = report.result.geometry.canvas();
                tracing::info!(
                    path = %path.display(),
                    original_size = report.descriptor.file_size,
                    new_size = report.new_size,
                    "resized"
                );
                summary.succeeded += 1;
                summary.total_original_bytes += report.descriptor.file_size;
                summary.total_new_bytes += report.new_size;
                send(
                    &progress,
                    ProcessEvent::FileResized {
                        completed,
                        total,
                        path: path.clone(),
                        original_size: report.descriptor.file_size,
                        new_size: report.new_size,
                        dimensions: Dimensions { width, height },
                    },
                );
            }
            Err(err) => {
                let kind = err.kind();
                tracing::warn!(path = %path.display(), %kind, error = %err, "resize failed");
                let record = FailureRecord {
                    path: path.clone(),
                    kind,
                    message: err.to_string(),
                };
                send(
                    &progress,
                    ProcessEvent::FileFailed {
                        completed,
                        total,
                        path: record.path.clone(),
                        kind,
                        message: record.message.clone(),
                    },
                );
                summary.failures.push(record);
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed_count(),
        "batch finished"
    );
    send(
        &progress,
        ProcessEvent::Finished {
            summary: summary.clone(),
        },
    );
    summary
}

/// A batch running on its worker thread.
pub struct BatchHandle {
    pub events: Receiver<ProcessEvent>,
    worker: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    /// Wait for the worker and return its summary.
    pub fn join(self) -> Result<BatchSummary, ProcessError> {
        self.worker.join().map_err(|_| ProcessError::WorkerPanicked)
    }
}

/// Start a batch on a dedicated worker thread.
///
/// The backend and file list move into the worker; events arrive on
/// [`BatchHandle::events`] until `Finished`.
pub fn spawn_batch<B>(
    backend: B,
    files: Vec<PathBuf>,
    config: BatchConfig,
) -> Result<BatchHandle, ProcessError>
where
    B: ImageBackend + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let worker = thread::Builder::new()
        .name("resize-worker".into())
        .spawn(move || process_batch(&backend, &files, &config, Some(tx)))?;
    Ok(BatchHandle { events: rx, worker })
}
