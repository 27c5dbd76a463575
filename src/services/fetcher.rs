use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Stage 1 seam: retrieve one object into a local file.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Download `key` to `dest`, creating or truncating the file.
    /// Returns the number of bytes written. No cleanup of a partially
    /// written file on failure; the run aborts right after anyway.
    async fn fetch(&self, key: &str, dest: &Path) -> Result<u64>;
}

/// Production fetcher backed by an S3-compatible bucket.
pub struct S3Fetcher {
    client: Client,
    bucket: String,
}

impl S3Fetcher {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectFetcher for S3Fetcher {
    async fn fetch(&self, key: &str, dest: &Path) -> Result<u64> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| PipelineError::Storage(DisplayErrorContext(&e).to_string()))?;

        let mut body = resp.body;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("fetched {} bytes from {}/{}", written, self.bucket, key);
        Ok(written)
    }
}
