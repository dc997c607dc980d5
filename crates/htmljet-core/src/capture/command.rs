//! Capture through an external browser-automation program.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use super::{CaptureReport, Capturer};
use crate::config::{CaptureConfig, ProcessingConfig};
use crate::error::PipelineError;
use crate::pipeline::discovery::FileDiscovery;

/// Runs the program configured in `capture.command`.
pub struct CommandCapturer {
    config: CaptureConfig,
    discovery: FileDiscovery,
}

impl CommandCapturer {
    pub fn new(config: CaptureConfig, processing: ProcessingConfig) -> Self {
        Self {
            config,
            discovery: FileDiscovery::new(processing),
        }
    }

    /// Substitute placeholders in the configured argument list.
    fn arguments(&self, url: &str, output_dir: &Path) -> Vec<String> {
        let output = output_dir.to_string_lossy();
        let element_timeout = self.config.element_timeout_ms.to_string();
        self.config
            .command
            .iter()
            .map(|arg| {
                arg.replace("{url}", url)
                    .replace("{output}", &output)
                    .replace("{selector}", &self.config.selector)
                    .replace("{element_timeout_ms}", &element_timeout)
            })
            .collect()
    }
}

#[async_trait]
impl Capturer for CommandCapturer {
    fn name(&self) -> &str {
        "command"
    }

    async fn capture(&self, url: &str, output_dir: &Path) -> Result<CaptureReport, PipelineError> {
        let capture_error = |message: String| PipelineError::Capture {
            url: url.to_string(),
            message,
        };

        let args = self.arguments(url, output_dir);
        let Some((program, rest)) = args.split_first() else {
            return Err(capture_error(
                "no capture command configured (set capture.command)".to_string(),
            ));
        };

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| capture_error(format!("cannot create {}: {}", output_dir.display(), e)))?;

        tracing::info!("Capturing {} with {:?}", url, program);
        tracing::debug!("Capture arguments: {:?}", rest);

        let child = tokio::process::Command::new(program)
            .args(rest)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(
            Duration::from_millis(self.config.timeout_ms),
            child,
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(capture_error(format!("failed to start {program}: {e}"))),
            Err(_) => {
                return Err(PipelineError::Timeout {
                    path: output_dir.to_path_buf(),
                    stage: "capture".to_string(),
                    timeout_ms: self.config.timeout_ms,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(capture_error(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        // The program reports nothing per element; every image it left counts
        let files = self.discovery.discover(output_dir).len();
        tracing::info!("Captured {} image(s) into {:?}", files, output_dir);

        Ok(CaptureReport {
            url: url.to_string(),
            output_dir: output_dir.to_path_buf(),
            files,
            successful: files,
            failed: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capturer(command: &[&str], timeout_ms: u64) -> CommandCapturer {
        let config = CaptureConfig {
            command: command.iter().map(|s| s.to_string()).collect(),
            timeout_ms,
            selector: ".card".to_string(),
            ..CaptureConfig::default()
        };
        CommandCapturer::new(config, ProcessingConfig::default())
    }

    #[test]
    fn test_placeholder_substitution() {
        let c = capturer(
            &["shoot", "--url={url}", "{output}", "{selector}", "{element_timeout_ms}"],
            1000,
        );
        let args = c.arguments("https://example.com", Path::new("/tmp/shots"));
        assert_eq!(
            args,
            vec!["shoot", "--url=https://example.com", "/tmp/shots", ".card", "5000"]
        );
    }

    #[tokio::test]
    async fn test_missing_command() {
        let dir = tempfile::tempdir().unwrap();
        let err = capturer(&[], 1000)
            .capture("https://example.com", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Capture { .. }));
        assert!(!err.is_per_file());
    }

    #[tokio::test]
    async fn test_unknown_program() {
        let dir = tempfile::tempdir().unwrap();
        let err = capturer(&["htmljet-no-such-program-xyz"], 1000)
            .capture("https://example.com", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Capture { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_counts_produced_images() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("shots");
        let c = capturer(
            &[
                "sh",
                "-c",
                "touch \"$1/element_0.png\" \"$1/element_1.png\" \"$1/log.txt\"",
                "sh",
                "{output}",
            ],
            10_000,
        );

        let report = c.capture("https://example.com", &out).await.unwrap();
        assert_eq!(report.files, 2);
        assert_eq!(report.successful, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.output_dir, out);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let c = capturer(&["sh", "-c", "echo navigation failed >&2; exit 3"], 10_000);

        let err = c
            .capture("https://example.com", dir.path())
            .await
            .unwrap_err();
        match err {
            PipelineError::Capture { message, .. } => {
                assert!(message.contains("navigation failed"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let c = capturer(&["sleep", "5"], 100);

        let err = c
            .capture("https://example.com", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { timeout_ms: 100, .. }));
        assert!(!err.is_per_file());
    }
}
