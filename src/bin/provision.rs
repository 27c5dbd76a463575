use clap::Parser;
use dotenvy::dotenv;
use s3ocr::services::seafile::{acquire_token, create_library};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// One-time setup helper: exchange Seafile credentials for an API token and
/// create the target library. Not part of the steady-state pipeline.
#[derive(Debug, Parser)]
#[command(
    name = "provision",
    about = "Acquire a Seafile API token and create the target library"
)]
struct Args {
    /// Seafile server URL, e.g. https://seafile.example.com
    #[arg(long)]
    seafile_url: String,

    /// Seafile account username
    #[arg(long)]
    username: String,

    /// Seafile account password
    #[arg(long, env = "SEAFILE_PASSWORD", hide_env_values = true)]
    password: String,

    /// One-time 2FA code, when the account has two-factor enabled
    #[arg(long)]
    otp: Option<String>,

    /// Name of the library to create
    #[arg(long, default_value = "s3ocr")]
    library_name: String,

    /// Description of the library to create
    #[arg(long, default_value = "OCR drop target")]
    library_desc: String,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure_tls: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "provision=info,s3ocr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("🔐 Requesting API token for {}", args.username);
    let token = acquire_token(
        &args.seafile_url,
        &args.username,
        &args.password,
        args.otp.as_deref(),
        args.insecure_tls,
    )
    .await?;

    info!("📚 Creating library '{}'", args.library_name);
    let repo_id = create_library(
        &args.seafile_url,
        &token,
        &args.library_name,
        &args.library_desc,
        args.insecure_tls,
    )
    .await?;

    info!("✅ Library created.");
    // Plain stdout so the values can be piped straight into an env file.
    println!("SEAFILE_TOKEN={token}");
    println!("SEAFILE_LIBRARY_ID={repo_id}");
    Ok(())
}
