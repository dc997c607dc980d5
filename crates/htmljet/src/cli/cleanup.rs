//! The `htmljet cleanup` command: deduplicate a directory of screenshots.

use clap::{Args, ValueEnum};
use htmljet_core::{Config, DedupSummary, Deduplicator, OutputFormat, OutputWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::expand;
use super::progress::{print_summary, BarReporter};

/// Report formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    /// The whole summary as one JSON document
    Json,
    /// One line per kept, discarded or failed file
    Jsonl,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => OutputFormat::Json,
            ReportFormat::Jsonl => OutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `cleanup` command.
#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Directory of screenshots to deduplicate
    #[arg(default_value = ".")]
    pub input: PathBuf,

    /// Similarity threshold between 0.0 (everything matches) and 1.0 (identical only)
    #[arg(short, long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Output directory (defaults to <input>/clean)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of files fingerprinted and copied concurrently
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Write a report of kept, discarded and failed files ("-" for stdout)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
}

/// Execute the cleanup command.
pub async fn execute(args: CleanupArgs, config: Config) -> anyhow::Result<()> {
    let mut config = config;
    if let Some(threshold) = args.threshold {
        config.dedup.similarity_threshold = threshold;
    }
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    config.validate()?;

    let input = expand(&args.input);
    let output = args.output.as_deref().map(expand);
    let report = args.report.as_deref().map(|path| (path, args.format));

    run_cleanup(&config, &input, output, report).await?;
    Ok(())
}

/// Run one deduplication pass, write the optional report and print the summary.
///
/// Shared with `snap`, which cleans up its capture directory the same way.
pub async fn run_cleanup(
    config: &Config,
    input: &Path,
    output: Option<PathBuf>,
    report: Option<(&Path, ReportFormat)>,
) -> anyhow::Result<DedupSummary> {
    let dedup = Deduplicator::new(config)?;
    let output = output.unwrap_or_else(|| config.default_output_dir(input));

    tracing::info!(
        "Deduplicating {:?} into {:?} (threshold {})",
        input,
        output,
        dedup.threshold().value()
    );

    let reporter = BarReporter::new();
    let summary = dedup.run(input, &output, &reporter).await?;

    if let Some((path, format)) = report {
        write_report(&summary, path, format)?;
    }

    for failure in &summary.failures {
        tracing::debug!("{:?} failed during {:?}: {}", failure.path, failure.stage, failure.message);
    }
    print_summary(&summary);

    Ok(summary)
}

fn write_report(summary: &DedupSummary, path: &Path, format: ReportFormat) -> anyhow::Result<()> {
    if path == Path::new("-") {
        let stdout = std::io::stdout();
        let mut writer = OutputWriter::new(stdout.lock(), format.into(), true);
        writer.write_summary(summary)?;
        writer.flush()?;
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = OutputWriter::new(BufWriter::new(file), format.into(), true);
    writer.write_summary(summary)?;
    writer.flush()?;
    tracing::info!("Report written to {:?}", path);
    Ok(())
}

pub(crate) fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0.0..=1.0"))
    }
}
