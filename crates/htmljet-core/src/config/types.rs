//! Sub-configuration structs with their defaults.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Deduplication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Minimum similarity (0.0 to 1.0) for two images to share a cluster.
    /// Higher values require a closer visual match.
    pub similarity_threshold: f64,

    /// Name of the output directory created inside the input directory
    /// when no explicit output path is given
    pub output_subdir: String,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.9,
            output_subdir: "clean".to_string(),
        }
    }
}

/// Perceptual fingerprint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Side of the luminance grid; the fingerprint holds `grid_size²` bits
    pub grid_size: u32,

    /// Resampling filter used to shrink the image onto the grid:
    /// nearest, triangle, catmullrom, gaussian, lanczos3
    pub filter: String,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            grid_size: 8,
            filter: "triangle".to_string(),
        }
    }
}

impl FingerprintConfig {
    /// Resolve the configured filter name to an `image` filter.
    pub fn filter_type(&self) -> Option<FilterType> {
        match self.filter.to_lowercase().as_str() {
            "nearest" => Some(FilterType::Nearest),
            "triangle" => Some(FilterType::Triangle),
            "catmullrom" => Some(FilterType::CatmullRom),
            "gaussian" => Some(FilterType::Gaussian),
            "lanczos3" => Some(FilterType::Lanczos3),
            _ => None,
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of parallel workers for fingerprinting and copying
    pub parallel_workers: usize,

    /// Supported input extensions (case-insensitive)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Screenshot capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// External program and arguments that replace the built-in browser.
    /// Placeholders `{url}`, `{output}`, `{selector}` and
    /// `{element_timeout_ms}` are substituted. Empty means headless Chromium.
    pub command: Vec<String>,

    /// Chrome/Chromium executable; detected automatically when unset
    pub browser_path: Option<String>,

    /// Run the browser without a window
    pub headless: bool,

    /// Browser window size as `[width, height]`
    pub window_size: [u32; 2],

    /// CSS selector for the elements to screenshot
    pub selector: String,

    /// Upper bound for the whole capture run in milliseconds
    pub timeout_ms: u64,

    /// Per-element screenshot timeout in milliseconds
    pub element_timeout_ms: u64,

    /// Directory screenshots are written to when none is given
    pub output_dir: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            browser_path: None,
            headless: true,
            window_size: [1920, 1080],
            selector: r#"[data-element_type="container"]"#.to_string(),
            timeout_ms: 120_000,
            element_timeout_ms: 5000,
            output_dir: "screenshots".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
