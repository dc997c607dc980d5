//! Built-in capture through Chromium and the DevTools protocol.
//!
//! Every element matching the selector is screenshotted to
//! `element_{i}.png`, where `i` is its position in the match list. Invisible
//! elements are skipped, and each screenshot has its own timeout. A skipped
//! or failed element counts as failed but does not stop the run.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;

use super::{element_path, CaptureReport, Capturer};
use crate::config::{expand_path, CaptureConfig, ProcessingConfig};
use crate::error::PipelineError;
use crate::pipeline::discovery::FileDiscovery;

/// True when the element has a box and is not hidden by style.
const IS_VISIBLE_JS: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden'
        && style.display !== 'none';
}"#;

/// What happened to one matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ElementOutcome {
    Saved,
    Hidden,
    TimedOut,
    Failed(String),
}

/// `(successful, failed)` over a run's element outcomes.
pub(crate) fn tally(outcomes: &[ElementOutcome]) -> (usize, usize) {
    let successful = outcomes
        .iter()
        .filter(|o| **o == ElementOutcome::Saved)
        .count();
    (successful, outcomes.len() - successful)
}

/// Launches Chromium, loads the page and screenshots matching elements.
pub struct BrowserCapturer {
    config: CaptureConfig,
    discovery: FileDiscovery,
}

impl BrowserCapturer {
    pub fn new(config: CaptureConfig, processing: ProcessingConfig) -> Self {
        Self {
            config,
            discovery: FileDiscovery::new(processing),
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, String> {
        let [width, height] = self.config.window_size;
        let mut builder = BrowserConfig::builder().window_size(width, height);
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.config.browser_path {
            builder = builder.chrome_executable(expand_path(path));
        }
        builder.build()
    }

    /// Load `url` and screenshot each matching element in document order.
    async fn capture_elements(
        &self,
        browser: &Browser,
        url: &str,
        output_dir: &Path,
    ) -> Result<Vec<ElementOutcome>, String> {
        let page = browser
            .new_page(url)
            .await
            .map_err(|e| format!("cannot open page: {e}"))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| format!("navigation failed: {e}"))?;

        let elements = page
            .find_elements(self.config.selector.as_str())
            .await
            .map_err(|e| format!("selector {:?} failed: {e}", self.config.selector))?;
        tracing::info!(
            "Found {} element(s) matching {:?}",
            elements.len(),
            self.config.selector
        );

        let mut outcomes = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let path = element_path(output_dir, index);
            let outcome = self.capture_element(element, &path).await;
            match &outcome {
                ElementOutcome::Saved => tracing::debug!("Saved {:?}", path),
                ElementOutcome::Hidden => tracing::debug!("Element {} not visible, skipped", index),
                ElementOutcome::TimedOut => tracing::warn!(
                    "Element {} timed out after {}ms",
                    index,
                    self.config.element_timeout_ms
                ),
                ElementOutcome::Failed(message) => {
                    tracing::warn!("Element {} failed: {}", index, message)
                }
            }
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn capture_element(&self, element: &Element, path: &Path) -> ElementOutcome {
        match is_visible(element).await {
            Ok(true) => {}
            Ok(false) => return ElementOutcome::Hidden,
            Err(message) => return ElementOutcome::Failed(message),
        }

        let screenshot = element.save_screenshot(CaptureScreenshotFormat::Png, path);
        match tokio::time::timeout(
            Duration::from_millis(self.config.element_timeout_ms),
            screenshot,
        )
        .await
        {
            Ok(Ok(_)) => ElementOutcome::Saved,
            Ok(Err(e)) => ElementOutcome::Failed(e.to_string()),
            Err(_) => ElementOutcome::TimedOut,
        }
    }
}

async fn is_visible(element: &Element) -> Result<bool, String> {
    let returns = element
        .call_js_fn(IS_VISIBLE_JS, false)
        .await
        .map_err(|e| e.to_string())?;
    Ok(returns
        .result
        .value
        .and_then(|value| value.as_bool())
        .unwrap_or(false))
}

#[async_trait]
impl Capturer for BrowserCapturer {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn capture(&self, url: &str, output_dir: &Path) -> Result<CaptureReport, PipelineError> {
        let capture_error = |message: String| PipelineError::Capture {
            url: url.to_string(),
            message,
        };

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| capture_error(format!("cannot create {}: {}", output_dir.display(), e)))?;

        let browser_config = self
            .browser_config()
            .map_err(|e| capture_error(format!("browser setup failed: {e}")))?;
        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| capture_error(format!("cannot launch browser: {e}")))?;

        // The handler drives the DevTools connection and must be polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Capturing {} with Chromium", url);
        let session = tokio::time::timeout(
            Duration::from_millis(self.config.timeout_ms),
            self.capture_elements(&browser, url, output_dir),
        )
        .await;

        if let Err(e) = browser.close().await {
            tracing::warn!("Browser did not close cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        handler_task.abort();

        let outcomes = match session {
            Ok(Ok(outcomes)) => outcomes,
            Ok(Err(message)) => return Err(capture_error(message)),
            Err(_) => {
                return Err(PipelineError::Timeout {
                    path: output_dir.to_path_buf(),
                    stage: "capture".to_string(),
                    timeout_ms: self.config.timeout_ms,
                })
            }
        };

        let (successful, failed) = tally(&outcomes);
        let files = self.discovery.discover(output_dir).len();
        tracing::info!("Successful: {}, Failed: {}", successful, failed);

        Ok(CaptureReport {
            url: url.to_string(),
            output_dir: output_dir.to_path_buf(),
            files,
            successful,
            failed,
        })
    }
}
