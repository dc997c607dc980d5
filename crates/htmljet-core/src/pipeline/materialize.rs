//! Copies cluster representatives into the output directory.
//!
//! Originals are never moved or modified. Copies run concurrently, bounded
//! by a semaphore; a failed copy is recorded and the rest carry on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::progress::{ProgressReporter, Stage};
use crate::error::PipelineError;
use crate::types::ImageRecord;

/// Outcome of materializing a set of representatives.
#[derive(Debug, Default)]
pub struct MaterializeOutcome {
    /// Destination paths written, in representative order
    pub copied: Vec<PathBuf>,
    /// One `PipelineError::Copy` per failed representative
    pub failures: Vec<PipelineError>,
}

/// Concurrent, non-destructive copier.
pub struct Materializer {
    parallel: usize,
}

impl Materializer {
    pub fn new(parallel: usize) -> Self {
        Self {
            parallel: parallel.max(1),
        }
    }

    /// Copy each representative to `output_dir/<file name>`.
    ///
    /// The output directory is created if absent.
    pub async fn materialize(
        &self,
        representatives: &[ImageRecord],
        output_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> MaterializeOutcome {
        reporter.stage_started(Stage::Copy, representatives.len() as u64);

        if let Err(e) = tokio::fs::create_dir_all(output_dir).await {
            // Every copy below will fail and be reported individually
            tracing::warn!("Cannot create output directory {:?}: {}", output_dir, e);
        }

        let semaphore = Arc::new(Semaphore::new(self.parallel));
        let mut handles = Vec::with_capacity(representatives.len());

        for record in representatives {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                tracing::warn!("Copy semaphore closed unexpectedly, stopping");
                break;
            };

            let source = record.path.clone();
            let destination = match record.path.file_name() {
                Some(name) => output_dir.join(name),
                None => output_dir.join(&record.file_name),
            };

            handles.push(tokio::spawn(async move {
                let result = copy_file(&source, &destination).await;
                drop(permit);
                (source, destination, result)
            }));
        }

        let mut outcome = MaterializeOutcome::default();
        for handle in handles {
            match handle.await {
                Ok((source, destination, Ok(()))) => {
                    reporter.file_finished(Stage::Copy, &source, true);
                    outcome.copied.push(destination);
                }
                Ok((source, destination, Err(message))) => {
                    tracing::warn!("Copy failed: {:?} -> {:?}: {}", source, destination, message);
                    reporter.file_finished(Stage::Copy, &source, false);
                    outcome.failures.push(PipelineError::Copy {
                        path: source,
                        destination,
                        message,
                    });
                }
                Err(e) => {
                    tracing::error!("Copy task panicked: {e}");
                    outcome.failures.push(PipelineError::Copy {
                        path: PathBuf::new(),
                        destination: output_dir.to_path_buf(),
                        message: format!("copy task failed: {e}"),
                    });
                }
            }
        }

        reporter.stage_finished(Stage::Copy);
        outcome
    }
}

async fn copy_file(source: &Path, destination: &Path) -> Result<(), String> {
    if same_file(source, destination).await {
        return Err("destination is the source file".to_string());
    }
    tokio::fs::copy(source, destination)
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}

async fn same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
