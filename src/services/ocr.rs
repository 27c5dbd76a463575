use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::OcrConfig;
use crate::error::{PipelineError, Result};

/// Output captured from a transformation run.
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    /// Combined stdout/stderr of the external tool, logged after completion.
    pub output: String,
}

/// Stage 2 seam: turn the fetched document into its processed counterpart.
///
/// Production runs `ocrmypdf`; tests substitute a fake to verify pipeline
/// sequencing without spawning a real process.
#[async_trait]
pub trait DocumentTransformer: Send + Sync {
    async fn transform(&self, input: &Path, output: &Path) -> Result<TransformReport>;
}

/// Adds a searchable text layer by invoking the external `ocrmypdf` binary.
///
/// No timeout is enforced here; the tool's own `--tesseract-timeout` is the
/// only bound on the run.
pub struct OcrmypdfTransformer {
    config: OcrConfig,
}

impl OcrmypdfTransformer {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DocumentTransformer for OcrmypdfTransformer {
    async fn transform(&self, input: &Path, output: &Path) -> Result<TransformReport> {
        let config = &self.config;
        debug!("running {} on {}", config.binary, input.display());

        let out = Command::new(&config.binary)
            .arg("--deskew")
            .arg("--tesseract-timeout")
            .arg(config.tesseract_timeout_secs.to_string())
            .arg("--skip-big")
            .arg(config.skip_big.to_string())
            .arg("-l")
            .arg(&config.language)
            .arg(input)
            .arg(output)
            .output()
            .await?;

        // The tool is chatty on both streams; keep everything for the log line.
        let stderr = String::from_utf8_lossy(&out.stderr);
        let mut captured = String::from_utf8_lossy(&out.stdout).into_owned();
        if !stderr.is_empty() {
            if !captured.is_empty() {
                captured.push('\n');
            }
            captured.push_str(&stderr);
        }

        if !out.status.success() {
            return Err(PipelineError::Process {
                command: config.binary.clone(),
                status: out.status,
                stderr: stderr.into_owned(),
            });
        }

        Ok(TransformReport { output: captured })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Coreutils stand-ins, so the tests need no OCR tooling installed.
    fn transformer_with_binary(binary: &str) -> OcrmypdfTransformer {
        OcrmypdfTransformer::new(OcrConfig {
            binary: binary.to_string(),
            ..OcrConfig::default()
        })
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_io_error() {
        let transformer = transformer_with_binary("definitely-not-a-real-binary-1f9a");
        let err = transformer
            .transform(Path::new("in.pdf"), Path::new("out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_a_process_error() {
        // `false` ignores all the flags and exits 1.
        let transformer = transformer_with_binary("false");
        let err = transformer
            .transform(Path::new("in.pdf"), Path::new("out.pdf"))
            .await
            .unwrap_err();
        match err {
            PipelineError::Process { command, status, .. } => {
                assert_eq!(command, "false");
                assert!(!status.success());
            }
            other => panic!("expected process error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_successful_run_captures_output() {
        // `echo` exits 0 and prints its arguments, including the file paths.
        let transformer = transformer_with_binary("echo");
        let report = transformer
            .transform(Path::new("in.pdf"), Path::new("out.pdf"))
            .await
            .unwrap();
        assert!(report.output.contains("--deskew"));
        assert!(report.output.contains("in.pdf"));
        assert!(report.output.contains("out.pdf"));
    }
}
