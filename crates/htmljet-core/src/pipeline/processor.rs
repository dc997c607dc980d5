//! Pipeline orchestration - wires together all deduplication stages.
//!
//! ```text
//! discover → fingerprint (parallel) → cluster (sequential) → copy (parallel)
//! ```

use std::path::Path;
use std::time::Instant;

use super::cluster::ClusterAssigner;
use super::discovery::FileDiscovery;
use super::extract::FingerprintExtractor;
use super::materialize::Materializer;
use super::progress::ProgressReporter;
use super::similarity::SimilarityThreshold;
use crate::config::Config;
use crate::error::{ConfigError, PipelineError, PipelineResult};
use crate::types::{DedupSummary, FailedFile, FailureStage};

/// Runs one deduplication pass over a directory.
pub struct Deduplicator {
    discovery: FileDiscovery,
    extractor: FingerprintExtractor,
    materializer: Materializer,
    threshold: SimilarityThreshold,
}

impl Deduplicator {
    /// Create a deduplicator from configuration.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            discovery: FileDiscovery::new(config.processing.clone()),
            extractor: FingerprintExtractor::new(config),
            materializer: Materializer::new(config.processing.parallel_workers),
            threshold: SimilarityThreshold::new(config.dedup.similarity_threshold)?,
        })
    }

    pub fn threshold(&self) -> SimilarityThreshold {
        self.threshold
    }

    /// Deduplicate `input_dir` into `output_dir`.
    ///
    /// Fails only on run-level problems (missing input, output equal to
    /// input). Per-file decode and copy failures are recorded in the summary.
    pub async fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> PipelineResult<DedupSummary> {
        let start = Instant::now();

        if !input_dir.is_dir() {
            return Err(PipelineError::InputNotFound(input_dir.to_path_buf()));
        }
        if resolves_to(output_dir, input_dir) {
            return Err(PipelineError::OutputIsInput(output_dir.to_path_buf()));
        }

        let files = self.discovery.discover(input_dir);
        tracing::info!(
            "Found {} image(s) in {:?} ({} bytes)",
            files.len(),
            input_dir,
            FileDiscovery::total_size(&files)
        );

        let mut failures = Vec::new();
        let mut records = Vec::with_capacity(files.len());
        for outcome in self.extractor.extract_all(&files, reporter).await {
            match outcome {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping: {}", e);
                    failures.push(failed(&e, FailureStage::Decode));
                }
            }
        }
        let decode_errors = failures.len();

        let assignment = ClusterAssigner::assign(self.threshold, records);
        tracing::info!(
            "Kept {} representative(s), discarded {} similar image(s) at threshold {}",
            assignment.representatives.len(),
            assignment.discarded.len(),
            self.threshold.value()
        );

        let copies = self
            .materializer
            .materialize(&assignment.representatives, output_dir, reporter)
            .await;
        let copy_errors = copies.failures.len();
        failures.extend(
            copies
                .failures
                .iter()
                .map(|e| failed(e, FailureStage::Copy)),
        );

        Ok(DedupSummary {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            similarity_threshold: self.threshold,
            scanned: files.len(),
            kept: assignment.representatives.len(),
            discarded: assignment.discarded.len(),
            decode_errors,
            copy_errors,
            representatives: assignment.representatives,
            discarded_files: assignment.discarded,
            failures,
            copied: copies.copied,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn failed(error: &PipelineError, stage: FailureStage) -> FailedFile {
    let path = match error {
        PipelineError::Decode { path, .. }
        | PipelineError::UnsupportedFormat { path, .. }
        | PipelineError::FileTooLarge { path, .. }
        | PipelineError::ImageTooLarge { path, .. }
        | PipelineError::Timeout { path, .. }
        | PipelineError::Copy { path, .. } => path.clone(),
        PipelineError::InputNotFound(path) | PipelineError::OutputIsInput(path) => path.clone(),
        PipelineError::Capture { url, .. } => url.into(),
    };
    FailedFile {
        path,
        stage,
        message: error.to_string(),
    }
}

/// Whether `candidate` names the same directory as `dir`.
fn resolves_to(candidate: &Path, dir: &Path) -> bool {
    match (candidate.canonicalize(), dir.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => candidate == dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress::NoProgress;
    use crate::test_support::{png_bytes, split_png};
    use std::path::PathBuf;

    fn dedup(threshold: f64) -> Deduplicator {
        let mut config = Config::default();
        config.dedup.similarity_threshold = threshold;
        Deduplicator::new(&config).unwrap()
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_rejects_bad_threshold() {
        let mut config = Config::default();
        config.dedup.similarity_threshold = 2.0;
        assert!(Deduplicator::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal() {
        let out = tempfile::tempdir().unwrap();
        let err = dedup(0.9)
            .run(Path::new("/no/such/shots"), out.path(), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));
        assert!(!err.is_per_file());
    }

    #[tokio::test]
    async fn test_output_equal_to_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = dedup(0.9)
            .run(dir.path(), dir.path(), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::OutputIsInput(_)));
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("clean");
        let summary = dedup(0.9).run(dir.path(), &out, &NoProgress).await.unwrap();

        assert_eq!(summary.scanned, 0);
        assert_eq!(summary.kept, 0);
        assert!(summary.is_consistent());
        assert!(out.is_dir());
    }

    #[tokio::test]
    async fn test_byte_identical_images_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = png_bytes(48, 48, |x, y| ((x ^ y) * 5 % 256) as u8);
        for name in ["c.png", "a.png", "b.png", "d.png"] {
            std::fs::write(dir.path().join(name), &bytes).unwrap();
        }
        let out = dir.path().join("clean");

        let summary = dedup(1.0).run(dir.path(), &out, &NoProgress).await.unwrap();

        assert_eq!(summary.scanned, 4);
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.discarded, 3);
        assert_eq!(summary.representatives[0].file_name, "a.png");
        assert_eq!(listing(&out), vec!["a.png"]);
        assert!(summary.is_consistent());
    }

    #[tokio::test]
    async fn test_opposite_images_stay_apart_at_exact_threshold() {
        let dir = tempfile::tempdir().unwrap();
        split_png(dir.path(), "left.png", 64, 64, true);
        split_png(dir.path(), "right.png", 64, 64, false);
        let out = dir.path().join("clean");

        let summary = dedup(1.0).run(dir.path(), &out, &NoProgress).await.unwrap();

        assert_eq!(summary.kept, 2);
        assert_eq!(summary.discarded, 0);
        assert_eq!(listing(&out), vec!["left.png", "right.png"]);
    }

    #[tokio::test]
    async fn test_zero_threshold_keeps_largest_file() {
        let dir = tempfile::tempdir().unwrap();
        split_png(dir.path(), "a.png", 16, 16, true);
        let noisy = png_bytes(128, 128, |x, y| ((x * 31 + y * 17 + x * y) % 251) as u8);
        std::fs::write(dir.path().join("b.png"), &noisy).unwrap();
        split_png(dir.path(), "c.png", 32, 32, false);
        let out = dir.path().join("clean");

        let summary = dedup(0.0).run(dir.path(), &out, &NoProgress).await.unwrap();

        assert_eq!(summary.kept, 1);
        assert_eq!(summary.representatives[0].file_name, "b.png");
        assert_eq!(summary.representatives[0].byte_size, noisy.len() as u64);
        assert_eq!(summary.discarded, 2);
        assert!(summary
            .discarded_files
            .iter()
            .all(|d| d.superseded_by.ends_with("b.png")));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        split_png(dir.path(), "element_0.png", 64, 64, true);
        split_png(dir.path(), "element_1.png", 64, 64, false);
        std::fs::write(dir.path().join("element_2.png"), "test image content").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let out = dir.path().join("clean");

        let summary = dedup(0.9).run(dir.path(), &out, &NoProgress).await.unwrap();

        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.decode_errors, 1);
        assert_eq!(summary.kept + summary.discarded, 2);
        assert!(summary.is_consistent());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].stage, FailureStage::Decode);
        assert!(summary.failures[0].path.ends_with("element_2.png"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_counts_as_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        split_png(dir.path(), "a.png", 64, 64, true);
        split_png(dir.path(), "b.png", 64, 64, false);
        std::os::unix::fs::symlink(dir.path().join("missing.png"), dir.path().join("c.png"))
            .unwrap();
        let out = dir.path().join("clean");

        let summary = dedup(0.9).run(dir.path(), &out, &NoProgress).await.unwrap();

        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.kept, 2);
        assert_eq!(summary.decode_errors, 1);
        assert!(summary.is_consistent());
        assert!(summary.failures[0].path.ends_with("c.png"));
        assert_eq!(summary.failures[0].stage, FailureStage::Decode);
    }

    #[tokio::test]
    async fn test_run_is_non_destructive() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..4)
            .map(|i| split_png(dir.path(), &format!("shot_{i}.png"), 32 + i * 8, 32, i % 2 == 0))
            .collect();
        let before: Vec<Vec<u8>> = paths.iter().map(|p| std::fs::read(p).unwrap()).collect();
        let out = dir.path().join("clean");

        let summary = dedup(0.9).run(dir.path(), &out, &NoProgress).await.unwrap();

        let after: Vec<Vec<u8>> = paths.iter().map(|p| std::fs::read(p).unwrap()).collect();
        assert_eq!(before, after);
        assert_eq!(summary.copied.len(), summary.kept);
        for rep in &summary.representatives {
            let copy = std::fs::read(out.join(&rep.file_name)).unwrap();
            assert_eq!(copy, std::fs::read(&rep.path).unwrap());
        }
        assert_eq!(listing(&out).len(), summary.kept);
    }

    #[tokio::test]
    async fn test_second_run_ignores_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        split_png(dir.path(), "a.png", 32, 32, true);
        let out = dir.path().join("clean");

        let first = dedup(0.9).run(dir.path(), &out, &NoProgress).await.unwrap();
        let second = dedup(0.9).run(dir.path(), &out, &NoProgress).await.unwrap();

        assert_eq!(first.scanned, 1);
        assert_eq!(second.scanned, 1);
        assert_eq!(second.copied, vec![out.join("a.png")]);
    }
}
