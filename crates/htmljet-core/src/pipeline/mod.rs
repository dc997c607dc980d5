//! Deduplication pipeline components.
//!
//! - **discovery**: Find image files in a directory, in listing order
//! - **validate**: Pre-decode checks (size, magic bytes)
//! - **decode**: Load and decode images under a timeout
//! - **fingerprint**: Average-hash fingerprints
//! - **extract**: Per-file extraction with bounded parallelism
//! - **similarity**: Distance metric and threshold
//! - **select**: Representative tie-break rule
//! - **cluster**: Greedy first-fit clustering
//! - **materialize**: Copy representatives to the output directory
//! - **progress**: Caller-owned progress events
//! - **processor**: Orchestrates the full run

pub mod cluster;
pub mod decode;
pub mod discovery;
pub mod extract;
pub mod fingerprint;
pub mod materialize;
pub mod processor;
pub mod progress;
pub mod select;
pub mod similarity;
pub mod validate;

pub use cluster::{Assignment, Cluster, ClusterAssigner};
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use extract::FingerprintExtractor;
pub use fingerprint::{Fingerprint, FingerprintHasher};
pub use materialize::{MaterializeOutcome, Materializer};
pub use processor::Deduplicator;
pub use progress::{NoProgress, ProgressReporter, Stage};
pub use similarity::{dissimilarity, SimilarityThreshold};
pub use validate::Validator;
