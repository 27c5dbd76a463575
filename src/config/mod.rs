use std::path::PathBuf;

use clap::Parser;

/// Command-line interface for the pipeline binary.
#[derive(Debug, Parser)]
#[command(
    name = "s3ocr",
    about = "Fetch a document from an S3 bucket, OCR it, upload the result to Seafile"
)]
pub struct Cli {
    /// S3 endpoint, e.g. minio.local:9000
    #[arg(long)]
    pub endpoint: String,

    /// S3 access key
    #[arg(long)]
    pub access_key: String,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET", hide_env_values = true)]
    pub secret_key: String,

    /// Use https when talking to the S3 endpoint
    #[arg(long)]
    pub use_ssl: bool,

    /// S3 bucket
    #[arg(long)]
    pub bucket: String,

    /// S3 object name (also becomes the uploaded filename)
    #[arg(long)]
    pub object: String,

    /// Seafile server URL, e.g. https://seafile.example.com
    #[arg(long)]
    pub seafile_url: String,

    /// Seafile API token, see the Seafile web API documentation
    #[arg(long, env = "SEAFILE_TOKEN", hide_env_values = true)]
    pub seafile_token: String,

    /// Seafile library id, e.g. 3e040126-4533-4d0c-97f3-baa284915515
    #[arg(long)]
    pub seafile_library_id: String,

    /// Skip TLS certificate verification on the Seafile connection
    /// (for deployments with self-signed certificates)
    #[arg(long)]
    pub insecure_tls: bool,

    /// OCR language, passed to ocrmypdf -l
    #[arg(long, default_value = "deu")]
    pub ocr_language: String,

    /// Per-page OCR timeout in seconds (ocrmypdf --tesseract-timeout)
    #[arg(long, default_value_t = 2400)]
    pub ocr_timeout: u64,

    /// Skip OCR on pages bigger than this (ocrmypdf --skip-big)
    #[arg(long, default_value_t = 50)]
    pub ocr_skip_big: u64,

    /// Directory where the fetched input and the OCR output are written
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,
}

/// Object-storage connection settings.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub use_ssl: bool,
    pub bucket: String,
}

impl S3Config {
    /// Endpoint URL with the scheme chosen by `use_ssl`. An endpoint that
    /// already carries a scheme is used as-is.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.use_ssl {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

/// Settings for the external OCR tool.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Executable name or path
    pub binary: String,
    pub language: String,
    pub tesseract_timeout_secs: u64,
    pub skip_big: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "ocrmypdf".to_string(),
            language: "deu".to_string(),
            tesseract_timeout_secs: 2400,
            skip_big: 50,
        }
    }
}

/// Seafile connection settings.
#[derive(Debug, Clone)]
pub struct SeafileConfig {
    pub url: String,
    pub token: String,
    pub library_id: String,
    /// Opt-in: accept invalid certificates. Default is full verification.
    pub insecure_tls: bool,
}

/// Immutable configuration for one pipeline run, passed to each stage
/// constructor. Built once from the CLI, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub s3: S3Config,
    pub ocr: OcrConfig,
    pub seafile: SeafileConfig,
    pub object: String,
    pub work_dir: PathBuf,
}

impl From<Cli> for PipelineConfig {
    fn from(cli: Cli) -> Self {
        Self {
            s3: S3Config {
                endpoint: cli.endpoint,
                access_key: cli.access_key,
                secret_key: cli.secret_key,
                use_ssl: cli.use_ssl,
                bucket: cli.bucket,
            },
            ocr: OcrConfig {
                language: cli.ocr_language,
                tesseract_timeout_secs: cli.ocr_timeout,
                skip_big: cli.ocr_skip_big,
                ..OcrConfig::default()
            },
            seafile: SeafileConfig {
                url: cli.seafile_url,
                token: cli.seafile_token,
                library_id: cli.seafile_library_id,
                insecure_tls: cli.insecure_tls,
            },
            object: cli.object,
            work_dir: cli.work_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ocr_config() {
        let config = OcrConfig::default();
        assert_eq!(config.binary, "ocrmypdf");
        assert_eq!(config.language, "deu");
        assert_eq!(config.tesseract_timeout_secs, 2400);
        assert_eq!(config.skip_big, 50);
    }

    #[test]
    fn test_endpoint_url_scheme() {
        let mut config = S3Config {
            endpoint: "minio.local:9000".to_string(),
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            use_ssl: false,
            bucket: "docs".to_string(),
        };
        assert_eq!(config.endpoint_url(), "http://minio.local:9000");

        config.use_ssl = true;
        assert_eq!(config.endpoint_url(), "https://minio.local:9000");

        config.endpoint = "http://already.scheme:9000".to_string();
        assert_eq!(config.endpoint_url(), "http://already.scheme:9000");
    }

    #[test]
    fn test_cli_maps_into_pipeline_config() {
        let cli = Cli::try_parse_from([
            "s3ocr",
            "--endpoint",
            "minio.local:9000",
            "--access-key",
            "ak",
            "--secret-key",
            "sk",
            "--bucket",
            "docs",
            "--object",
            "report.pdf",
            "--seafile-url",
            "https://seafile.example.com",
            "--seafile-token",
            "abc123",
            "--seafile-library-id",
            "lib-1",
        ])
        .unwrap();

        let config = PipelineConfig::from(cli);
        assert_eq!(config.s3.bucket, "docs");
        assert_eq!(config.object, "report.pdf");
        assert_eq!(config.ocr.language, "deu");
        assert!(!config.seafile.insecure_tls);
        assert_eq!(config.work_dir, PathBuf::from("."));
    }
}
