//! htmljet Core - perceptual deduplication of element screenshots.
//!
//! A page captured element by element produces many images that look the
//! same: repeated cards, identical headers, placeholder boxes. This crate
//! fingerprints every image in a directory, groups the near-identical ones
//! and copies one representative per group into a clean output directory.
//!
//! # Architecture
//!
//! ```text
//! Directory → Discover → Fingerprint (parallel) → Cluster → Copy → Summary
//! ```
//!
//! Capturing the screenshots is a separate concern behind the
//! [`Capturer`] trait; the engine only ever looks at a finished directory.
//!
//! # Usage
//!
//! ```rust,ignore
//! use htmljet_core::{Config, Deduplicator, NoProgress};
//!
//! #[tokio::main]
//! async fn main() -> htmljet_core::Result<()> {
//!     let config = Config::load()?;
//!     let dedup = Deduplicator::new(&config)?;
//!
//!     let input = std::path::Path::new("./screenshots");
//!     let output = config.default_output_dir(input);
//!     let summary = dedup.run(input, &output, &NoProgress).await?;
//!     println!("Kept {} of {}", summary.kept, summary.scanned);
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

pub use capture::{BrowserCapturer, CaptureReport, Capturer, CapturerFactory, CommandCapturer};
pub use config::Config;
pub use error::{ConfigError, HtmljetError, PipelineError, PipelineResult, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    ClusterAssigner, Deduplicator, DiscoveredFile, FileDiscovery, Fingerprint, FingerprintHasher,
    Materializer, NoProgress, ProgressReporter, SimilarityThreshold, Stage,
};
pub use types::{DedupSummary, Discarded, FailedFile, FailureStage, ImageRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
