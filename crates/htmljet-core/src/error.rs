//! Error types for the htmljet deduplication pipeline.
//!
//! Per-file errors (decode, copy) are recovered by the pipeline and recorded
//! in the run summary. Run-level errors (missing input, capture failure,
//! invalid configuration) abort the run and surface to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for htmljet operations.
#[derive(Error, Debug)]
pub enum HtmljetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image could not be read or decoded
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// Writing a representative to the output directory failed
    #[error("Copy failed for {path} -> {destination}: {message}")]
    Copy {
        path: PathBuf,
        destination: PathBuf,
        message: String,
    },

    /// Input directory is missing or not a directory
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),

    /// Output directory resolves to the input directory
    #[error("Output directory must differ from the input directory: {0}")]
    OutputIsInput(PathBuf),

    /// External screenshot capture failed
    #[error("Capture failed for {url}: {message}")]
    Capture { url: String, message: String },
}

impl PipelineError {
    /// Whether this error only affects a single file and the run can go on.
    pub fn is_per_file(&self) -> bool {
        match self {
            PipelineError::InputNotFound(_)
            | PipelineError::OutputIsInput(_)
            | PipelineError::Capture { .. } => false,
            PipelineError::Timeout { stage, .. } => stage != "capture",
            _ => true,
        }
    }
}

/// Convenience type alias for htmljet results.
pub type Result<T> = std::result::Result<T, HtmljetError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
