use aws_sdk_s3::config::{Credentials, Region};
use tracing::info;

use crate::config::S3Config;

/// Build an S3 client for a MinIO-style endpoint with static credentials
/// and path-style addressing.
pub async fn setup_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    info!(
        "☁️  S3 Storage: {} (Bucket: {})",
        config.endpoint_url(),
        config.bucket
    );

    let aws_config = aws_config::from_env()
        .endpoint_url(config.endpoint_url())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
