//! Per-file fingerprint extraction with bounded parallelism.
//!
//! Every file is validated, read once, content-hashed, decoded and
//! fingerprinted independently of the others. Results are handed back in
//! listing order regardless of completion order, because clustering depends
//! on it.

use futures_util::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;

use super::decode::ImageDecoder;
use super::discovery::DiscoveredFile;
use super::fingerprint::FingerprintHasher;
use super::progress::{ProgressReporter, Stage};
use super::validate::Validator;
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageRecord;

/// Turns image files into [`ImageRecord`]s.
pub struct FingerprintExtractor {
    validator: Validator,
    decoder: ImageDecoder,
    hasher: Arc<FingerprintHasher>,
    workers: usize,
}

impl FingerprintExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            hasher: Arc::new(FingerprintHasher::new(&config.fingerprint)),
            workers: config.processing.parallel_workers.max(1),
        }
    }

    /// Fingerprint a single file.
    pub async fn extract(&self, path: &Path) -> PipelineResult<ImageRecord> {
        self.validator.validate(path)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })?;
        let byte_size = bytes.len() as u64;
        let content_hash = content_hash(&bytes);

        let decoded = self.decoder.decode_from_bytes(bytes, path).await?;
        let (width, height) = (decoded.width, decoded.height);

        let hasher = Arc::clone(&self.hasher);
        let image = decoded.image;
        let fingerprint = tokio::task::spawn_blocking(move || hasher.fingerprint(&image))
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            })?;

        // Display only; copies are named from `path`
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(
            "Fingerprinted {:?}: {} ({}x{}, {} bytes)",
            file_name,
            fingerprint,
            width,
            height,
            byte_size
        );

        Ok(ImageRecord {
            path: path.to_path_buf(),
            file_name,
            fingerprint,
            byte_size,
            content_hash,
            width,
            height,
        })
    }

    /// Fingerprint every file, at most `workers` at a time.
    ///
    /// The returned vector is index-aligned with `files`.
    pub async fn extract_all(
        &self,
        files: &[DiscoveredFile],
        reporter: &dyn ProgressReporter,
    ) -> Vec<PipelineResult<ImageRecord>> {
        reporter.stage_started(Stage::Fingerprint, files.len() as u64);

        let mut results: Vec<(usize, PipelineResult<ImageRecord>)> =
            stream::iter(files.iter().enumerate())
                .map(|(index, file)| async move {
                    let outcome = self.extract(&file.path).await;
                    reporter.file_finished(Stage::Fingerprint, &file.path, outcome.is_ok());
                    (index, outcome)
                })
                .buffer_unordered(self.workers)
                .collect()
                .await;

        reporter.stage_finished(Stage::Fingerprint);

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

/// BLAKE3 hex digest of a file's bytes.
pub fn content_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress::NoProgress;
    use crate::test_support::{png_bytes, split_png};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(Stage, PathBuf, bool)>>,
        totals: Mutex<Vec<u64>>,
    }

    impl ProgressReporter for Recorder {
        fn stage_started(&self, _stage: Stage, total: u64) {
            self.totals.lock().unwrap().push(total);
        }

        fn file_finished(&self, stage: Stage, path: &Path, ok: bool) {
            self.events
                .lock()
                .unwrap()
                .push((stage, path.to_path_buf(), ok));
        }
    }

    fn discovered(path: PathBuf) -> DiscoveredFile {
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        DiscoveredFile { path, size }
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(content_hash(b"").len(), 64);
    }

    #[tokio::test]
    async fn test_extract_record_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = split_png(dir.path(), "element_0.png", 64, 32, true);

        let extractor = FingerprintExtractor::new(&Config::default());
        let record = extractor.extract(&path).await.unwrap();

        assert_eq!(record.file_name, "element_0.png");
        assert_eq!((record.width, record.height), (64, 32));
        assert_eq!(record.byte_size, std::fs::metadata(&path).unwrap().len());
        assert_eq!(record.fingerprint.len(), 64);
        assert_eq!(
            record.content_hash,
            content_hash(&std::fs::read(&path).unwrap())
        );
    }

    #[tokio::test]
    async fn test_identical_bytes_identical_fingerprints() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = png_bytes(40, 40, |x, y| ((x * 7 + y * 3) % 256) as u8);
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        std::fs::write(&a, &bytes).unwrap();
        std::fs::write(&b, &bytes).unwrap();

        let extractor = FingerprintExtractor::new(&Config::default());
        let ra = extractor.extract(&a).await.unwrap();
        let rb = extractor.extract(&b).await.unwrap();
        assert_eq!(ra.fingerprint, rb.fingerprint);
        assert_eq!(ra.content_hash, rb.content_hash);
    }

    #[tokio::test]
    async fn test_extract_all_preserves_listing_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for i in 0..12 {
            // Larger images first so completion order tends to differ
            let side = 256 - i * 16;
            let path = split_png(dir.path(), &format!("{i:02}.png"), side, side, i % 2 == 0);
            files.push(discovered(path));
        }

        let mut config = Config::default();
        config.processing.parallel_workers = 4;
        let extractor = FingerprintExtractor::new(&config);
        let results = extractor.extract_all(&files, &NoProgress).await;

        assert_eq!(results.len(), files.len());
        for (file, result) in files.iter().zip(&results) {
            assert_eq!(&result.as_ref().unwrap().path, &file.path);
        }
    }

    #[tokio::test]
    async fn test_extract_all_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = split_png(dir.path(), "good.png", 32, 32, true);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, "test image content").unwrap();
        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, b"").unwrap();

        let files = vec![discovered(bad), discovered(good), discovered(empty)];
        let recorder = Recorder::default();
        let extractor = FingerprintExtractor::new(&Config::default());
        let results = extractor.extract_all(&files, &recorder).await;

        assert!(results[0].is_err());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());

        assert_eq!(*recorder.totals.lock().unwrap(), vec![3]);
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events.iter().filter(|(_, _, ok)| *ok).count(), 1);
        assert!(events.iter().all(|(stage, _, _)| *stage == Stage::Fingerprint));
    }
}
