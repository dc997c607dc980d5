//! Screenshot capture, the producer side of a cleanup run.
//!
//! The built-in [`BrowserCapturer`] drives headless Chromium over the
//! DevTools protocol. Setting `capture.command` swaps it for
//! [`CommandCapturer`], which runs an external program instead. The
//! deduplication engine never sees capture state; it only runs over the
//! directory the capturer leaves behind.

mod browser;
mod command;

pub use browser::BrowserCapturer;
pub use command::CommandCapturer;

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{CaptureConfig, ProcessingConfig};
use crate::error::PipelineError;

/// What a capture run produced.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub url: String,
    pub output_dir: PathBuf,
    /// Image files present in `output_dir` after the run
    pub files: usize,
    /// Elements written as screenshots
    pub successful: usize,
    /// Elements skipped as invisible, timed out or failed
    pub failed: usize,
}

/// Produces element screenshots for a page.
///
/// Uses `async_trait` so capturers can sit behind `Box<dyn Capturer>`.
#[async_trait]
pub trait Capturer: Send + Sync {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Capture `url` into `output_dir`, creating the directory if needed.
    async fn capture(&self, url: &str, output_dir: &Path) -> Result<CaptureReport, PipelineError>;
}

/// Picks the capturer the configuration asks for.
pub struct CapturerFactory;

impl CapturerFactory {
    /// An external command when `capture.command` is set, the built-in
    /// browser otherwise. `selector_override` replaces `capture.selector`.
    pub fn create(
        config: &CaptureConfig,
        processing: &ProcessingConfig,
        selector_override: Option<&str>,
    ) -> Box<dyn Capturer> {
        let mut config = config.clone();
        if let Some(selector) = selector_override {
            config.selector = selector.to_string();
        }

        if config.command.is_empty() {
            Box::new(BrowserCapturer::new(config, processing.clone()))
        } else {
            Box::new(CommandCapturer::new(config, processing.clone()))
        }
    }
}

/// Screenshot path for the `index`-th matched element.
pub fn element_path(output_dir: &Path, index: usize) -> PathBuf {
    output_dir.join(format!("element_{index}.png"))
}
