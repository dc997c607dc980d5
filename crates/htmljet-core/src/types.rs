//! Core data types for the htmljet deduplication pipeline.
//!
//! These types carry a run from fingerprinting through clustering to the
//! final summary. None of them outlive the run that created them.

use serde::Serialize;
use std::path::PathBuf;

use crate::pipeline::fingerprint::Fingerprint;
use crate::pipeline::similarity::SimilarityThreshold;

/// One successfully fingerprinted input file.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    /// Path to the source file
    pub path: PathBuf,

    /// Just the filename portion; also the name of the materialized copy
    pub file_name: String,

    /// Perceptual fingerprint
    pub fingerprint: Fingerprint,

    /// File size in bytes, used to pick cluster representatives
    pub byte_size: u64,

    /// BLAKE3 hash of the file contents
    pub content_hash: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,
}

/// A record dropped during clustering.
#[derive(Debug, Clone, Serialize)]
pub struct Discarded {
    /// The dropped file
    pub path: PathBuf,

    /// Representative of the cluster at the moment the decision was made
    pub superseded_by: PathBuf,

    /// Index of the cluster, in creation order
    pub cluster: usize,
}

/// Pipeline stage in which a per-file failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Decode,
    Copy,
}

/// A per-file failure that was skipped over.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub stage: FailureStage,
    pub message: String,
}

/// Outcome of one deduplication run.
///
/// Counts always satisfy `scanned == kept + discarded + decode_errors`.
/// Copy failures do not change `kept`: a representative whose copy failed
/// still formed a cluster.
#[derive(Debug, Clone, Serialize)]
pub struct DedupSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub similarity_threshold: SimilarityThreshold,

    /// Files matching a supported extension
    pub scanned: usize,

    /// Clusters formed, one representative each
    pub kept: usize,

    /// Records dropped in favour of a representative
    pub discarded: usize,

    /// Files that could not be fingerprinted
    pub decode_errors: usize,

    /// Representatives whose copy failed
    pub copy_errors: usize,

    /// Surviving representatives in cluster creation order
    pub representatives: Vec<ImageRecord>,

    pub discarded_files: Vec<Discarded>,

    pub failures: Vec<FailedFile>,

    /// Files written to the output directory
    pub copied: Vec<PathBuf>,

    pub elapsed_ms: u64,
}

impl DedupSummary {
    /// Whether the counts add up.
    pub fn is_consistent(&self) -> bool {
        self.scanned == self.kept + self.discarded + self.decode_errors
            && self.kept == self.representatives.len()
            && self.discarded == self.discarded_files.len()
    }
}
