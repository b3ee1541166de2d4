use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use data_analyst_api::server::{self, ServerConfig, DEFAULT_UPLOAD_LIMIT_MB};

/// CLI arguments for the analysis server
#[derive(Parser)]
#[command(name = "data-analyst-api")]
#[command(about = "Upload CSV/Excel files, summarize numeric columns, render charts")]
#[command(version)]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind to
    #[arg(long, default_value = "8000")]
    port: u16,

    /// CORS allowed origins (comma-separated)
    #[arg(long, default_value = "http://localhost:3000,http://127.0.0.1:3000")]
    cors_origin: String,

    /// Maximum request body size in megabytes
    #[arg(long, default_value_t = DEFAULT_UPLOAD_LIMIT_MB)]
    upload_limit_mb: usize,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            cors_origins: cli
                .cors_origin
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            upload_limit_bytes: cli.upload_limit_mb * 1024 * 1024,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "data_analyst_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from(Cli::parse());
    let app = server::router(&config);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    info!("CORS origins: {}", config.cors_origins.join(", "));
    info!("Upload limit: {} bytes", config.upload_limit_bytes);

    axum::serve(listener, app).await?;
    Ok(())
}
