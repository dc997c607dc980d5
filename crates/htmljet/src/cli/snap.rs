//! The `htmljet snap` command: capture a page, then clean up the captures.

use clap::Args;
use htmljet_core::{CapturerFactory, Config};
use std::path::PathBuf;

use super::cleanup::{parse_threshold, run_cleanup};
use super::expand;

/// Arguments for the `snap` command.
#[derive(Args, Debug)]
pub struct SnapArgs {
    /// Page to capture
    pub url: String,

    /// Directory for raw screenshots (defaults to capture.output_dir)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Similarity threshold for the cleanup pass (0.0-1.0)
    #[arg(short, long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// CSS selector for the elements to capture
    #[arg(long)]
    pub selector: Option<String>,
}

/// Execute the snap command.
pub async fn execute(args: SnapArgs, config: Config) -> anyhow::Result<()> {
    let mut config = config;
    if let Some(threshold) = args.threshold {
        config.dedup.similarity_threshold = threshold;
    }
    config.validate()?;

    let output_dir = args
        .output_dir
        .as_deref()
        .map(expand)
        .unwrap_or_else(|| config.capture_dir());

    let capturer = CapturerFactory::create(
        &config.capture,
        &config.processing,
        args.selector.as_deref(),
    );

    tracing::info!("Using {} capturer", capturer.name());
    let report = capturer.capture(&args.url, &output_dir).await?;
    eprintln!(
        "Captured {} image(s) from {} into {} (successful: {}, failed: {})",
        report.files,
        report.url,
        report.output_dir.display(),
        report.successful,
        report.failed
    );

    if report.files == 0 {
        tracing::warn!("Capture produced no images; nothing to clean up");
        return Ok(());
    }

    run_cleanup(&config, &report.output_dir, None, None).await?;
    Ok(())
}
