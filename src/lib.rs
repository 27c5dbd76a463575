pub mod config;
pub mod error;
pub mod infrastructure;
pub mod services;
pub mod utils;

use std::sync::Arc;

pub use config::{Cli, OcrConfig, PipelineConfig, S3Config, SeafileConfig};
pub use error::{PipelineError, Result};

use services::fetcher::S3Fetcher;
use services::ocr::OcrmypdfTransformer;
use services::pipeline::{Pipeline, TransferRequest};
use services::seafile::SeafileClient;

/// Wire the production stages together and run one object through them.
pub async fn run(config: PipelineConfig) -> Result<String> {
    let s3_client = infrastructure::storage::setup_s3_client(&config.s3).await;

    let pipeline = Pipeline::new(
        Arc::new(S3Fetcher::new(s3_client, config.s3.bucket.clone())),
        Arc::new(OcrmypdfTransformer::new(config.ocr.clone())),
        Arc::new(SeafileClient::new(&config.seafile)?),
    );

    let request = TransferRequest::new(&config.s3.bucket, &config.object, &config.work_dir);
    pipeline.run(&request).await
}
