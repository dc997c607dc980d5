//! Report output in JSON and JSONL form.
//!
//! JSON writes the whole [`DedupSummary`] as one document. JSONL writes one
//! line per kept, discarded or failed file, tagged with a `kind` field, so a
//! report can be filtered with line-oriented tools.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{DedupSummary, Discarded, FailedFile, ImageRecord};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

/// One line of a JSONL report.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ReportLine<'a> {
    Kept(&'a ImageRecord),
    Discarded(&'a Discarded),
    Failed(&'a FailedFile),
}

/// A writer that serializes items to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            // JSONL is never pretty-printed
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    /// Write a run summary.
    ///
    /// JSONL order: kept representatives, then discarded files, then failures.
    pub fn write_summary(&mut self, summary: &DedupSummary) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write(summary),
            OutputFormat::JsonLines => {
                let lines = summary
                    .representatives
                    .iter()
                    .map(ReportLine::Kept)
                    .chain(summary.discarded_files.iter().map(ReportLine::Discarded))
                    .chain(summary.failures.iter().map(ReportLine::Failed));
                for line in lines {
                    self.write(&line)?;
                }
                Ok(())
            }
        }
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::similarity::SimilarityThreshold;
    use crate::test_support::record;
    use crate::types::FailureStage;
    use std::path::PathBuf;

    fn summary() -> DedupSummary {
        DedupSummary {
            input_dir: PathBuf::from("shots"),
            output_dir: PathBuf::from("shots/clean"),
            similarity_threshold: SimilarityThreshold::default(),
            scanned: 4,
            kept: 2,
            discarded: 1,
            decode_errors: 1,
            copy_errors: 0,
            representatives: vec![record("a.png", 0x1, 300), record("c.png", 0xff00, 120)],
            discarded_files: vec![Discarded {
                path: PathBuf::from("b.png"),
                superseded_by: PathBuf::from("a.png"),
                cluster: 0,
            }],
            failures: vec![FailedFile {
                path: PathBuf::from("d.png"),
                stage: FailureStage::Decode,
                message: "Decode error for d.png: bad magic".to_string(),
            }],
            copied: vec![PathBuf::from("shots/clean/a.png"), PathBuf::from("shots/clean/c.png")],
            elapsed_ms: 12,
        }
    }

    #[test]
    fn test_summary_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, true);
        writer.write_summary(&summary()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["scanned"], 4);
        assert_eq!(value["similarity_threshold"], 0.9);
        assert_eq!(value["representatives"][0]["file_name"], "a.png");
        assert_eq!(
            value["representatives"][0]["fingerprint"],
            "0000000000000001"
        );
        assert_eq!(value["failures"][0]["stage"], "decode");
    }

    #[test]
    fn test_summary_jsonl_kinds_in_order() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_summary(&summary()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let kinds: Vec<String> = output
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["kind"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(kinds, vec!["kept", "kept", "discarded", "failed"]);
        assert!(output.lines().nth(2).unwrap().contains("\"superseded_by\":\"a.png\""));
    }
}
