use clap::Parser;
use dotenvy::dotenv;
use s3ocr::config::{Cli, PipelineConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3ocr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PipelineConfig::from(Cli::parse());

    info!(
        "🚀 Processing {}/{} → {}",
        config.s3.bucket, config.object, config.seafile.url
    );

    match s3ocr::run(config).await {
        Ok(id) => info!("✅ finished: {}", id),
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
