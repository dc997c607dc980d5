//! Terminal progress bars and the end-of-run summary.

use console::Style;
use htmljet_core::{DedupSummary, ProgressReporter, Stage};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Shows one progress bar per pipeline stage on stderr.
#[derive(Default)]
pub struct BarReporter {
    bar: Mutex<Option<ProgressBar>>,
    failed: AtomicU64,
}

impl BarReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl ProgressReporter for BarReporter {
    fn stage_started(&self, stage: Stage, total: u64) {
        self.failed.store(0, Ordering::Relaxed);
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(create_progress_bar(total, stage.label()));
        }
    }

    fn file_finished(&self, _stage: Stage, _path: &Path, ok: bool) {
        let failed = if ok {
            self.failed.load(Ordering::Relaxed)
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed) + 1
        };
        self.with_bar(|bar| {
            bar.inc(1);
            if failed > 0 {
                bar.set_message(format!("{failed} failed"));
            }
        });
    }

    fn stage_finished(&self, stage: Stage) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
        tracing::debug!("{} finished", stage.label());
    }
}

fn create_progress_bar(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:>14} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_prefix(label.to_string());
    pb
}

/// Print a formatted summary table to stderr.
pub fn print_summary(summary: &DedupSummary) {
    let green = Style::new().for_stderr().green();
    let yellow = Style::new().for_stderr().yellow();
    let red = Style::new().for_stderr().red();
    let bold = Style::new().for_stderr().bold();

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               {}", bold.apply_to("Summary"));
    eprintln!("  ====================================");
    eprintln!("    Scanned:      {:>8}", summary.scanned);
    eprintln!("    Kept:         {}", green.apply_to(format!("{:>8}", summary.kept)));
    eprintln!("    Discarded:    {}", yellow.apply_to(format!("{:>8}", summary.discarded)));
    if summary.decode_errors > 0 {
        eprintln!("    Unreadable:   {}", red.apply_to(format!("{:>8}", summary.decode_errors)));
    }
    if summary.copy_errors > 0 {
        eprintln!("    Copy errors:  {}", red.apply_to(format!("{:>8}", summary.copy_errors)));
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Threshold:    {:>8.2}", summary.similarity_threshold.value());
    eprintln!("    Reduction:    {:>7.1}%", reduction_percent(summary));
    eprintln!("    Duration:     {:>7.1}s", summary.elapsed_ms as f64 / 1000.0);
    eprintln!("  ====================================");
    eprintln!("    Output: {}", summary.output_dir.display());
}

/// Share of fingerprinted images that were dropped.
fn reduction_percent(summary: &DedupSummary) -> f64 {
    let fingerprinted = summary.kept + summary.discarded;
    if fingerprinted == 0 {
        0.0
    } else {
        summary.discarded as f64 * 100.0 / fingerprinted as f64
    }
}
