//! Caller-owned progress reporting.
//!
//! The pipeline never owns a reporter; one is borrowed for the duration of a
//! run. All methods default to no-ops so implementors pick what they need.

use std::path::Path;

/// Stages that report per-file progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fingerprint,
    Copy,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Fingerprint => "Fingerprinting",
            Stage::Copy => "Copying",
        }
    }
}

/// Receives progress events from a deduplication run.
pub trait ProgressReporter: Send + Sync {
    /// A stage is about to process `total` files.
    fn stage_started(&self, _stage: Stage, _total: u64) {}

    /// One file finished in `stage`, successfully or not.
    fn file_finished(&self, _stage: Stage, _path: &Path, _ok: bool) {}

    fn stage_finished(&self, _stage: Stage) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
