use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::services::fetcher::ObjectFetcher;
use crate::services::ocr::DocumentTransformer;
use crate::services::seafile::Uploader;

/// Everything the stages need to know about the one object in flight.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub bucket: String,
    pub object: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl TransferRequest {
    /// The fetched original lands in `todo-<object>`; the OCR output keeps
    /// the object name so the upload carries it unchanged.
    pub fn new(bucket: &str, object: &str, work_dir: &Path) -> Self {
        Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
            input_path: work_dir.join(format!("todo-{object}")),
            output_path: work_dir.join(object),
        }
    }
}

/// Sequential three-stage pipeline: fetch, transform, upload.
///
/// Fail-fast: the first error aborts the run and later stages never start.
/// Both local files are left in place on every exit path; they double as a
/// debugging aid when a run dies halfway.
pub struct Pipeline {
    fetcher: Arc<dyn ObjectFetcher>,
    transformer: Arc<dyn DocumentTransformer>,
    uploader: Arc<dyn Uploader>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn ObjectFetcher>,
        transformer: Arc<dyn DocumentTransformer>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        Self {
            fetcher,
            transformer,
            uploader,
        }
    }

    /// Run all three stages for one object. Returns the uploaded identifier.
    pub async fn run(&self, request: &TransferRequest) -> Result<String> {
        info!("⬇️  Fetching {}/{}", request.bucket, request.object);
        let bytes = self
            .fetcher
            .fetch(&request.object, &request.input_path)
            .await?;
        info!(
            "Fetched {} ({} bytes)",
            request.input_path.display(),
            bytes
        );

        info!("🔍 Running OCR on {}", request.input_path.display());
        let report = self
            .transformer
            .transform(&request.input_path, &request.output_path)
            .await?;
        if !report.output.is_empty() {
            info!("{}", report.output);
        }

        info!("⬆️  Uploading {}", request.output_path.display());
        self.uploader.upload(&request.output_path, "/").await
    }
}
