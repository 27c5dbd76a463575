use thiserror::Error;

/// Failure classes for a pipeline run. Nothing is retried; every variant is
/// fatal and bubbles up to `main`, which decides the exit code.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Network-level failure talking to object storage.
    #[error("storage transport error: {0}")]
    Storage(String),

    /// Network-level failure talking to the Seafile API.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote answered, but not with the shape we expect
    /// (missing JSON field, missing header, malformed body).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The external OCR tool exited non-zero.
    #[error("{command} exited with {status}: {stderr}")]
    Process {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
