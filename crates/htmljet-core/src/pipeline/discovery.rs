//! File discovery for finding images in a capture directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Lists the image files directly inside a directory.
///
/// The listing is flat: the default output directory lives inside the input
/// directory and must not be picked up on a second run.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files in `dir`, sorted by file name.
    ///
    /// The sort order is the processing order of the run, so it is part of
    /// the observable result. Hidden files and unsupported extensions are
    /// skipped silently. A supported name that cannot be stat'ed (dangling
    /// symlink, permission error) is still listed with size 0, so the run
    /// reports it as unreadable instead of losing it.
    pub fn discover(&self, dir: &Path) -> Vec<DiscoveredFile> {
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if let Some(path) = e.path().filter(|_| e.depth() > 0) {
                        if self.is_candidate(path) {
                            tracing::warn!("Cannot stat {:?}: {}", path, e);
                            files.push(DiscoveredFile {
                                path: path.to_path_buf(),
                                size: 0,
                            });
                        }
                    }
                    continue;
                }
            };

            let entry_path = entry.path();
            if !entry.file_type().is_file() || !self.is_candidate(entry_path) {
                continue;
            }
            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    tracing::warn!("Cannot read metadata for {:?}: {}", entry_path, e);
                    0
                }
            };
            files.push(DiscoveredFile {
                path: entry_path.to_path_buf(),
                size,
            });
        }

        files
    }

    /// Visible file with a supported extension.
    fn is_candidate(&self, path: &Path) -> bool {
        !path.file_name().map(is_hidden).unwrap_or(true) && self.is_supported(path)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}
