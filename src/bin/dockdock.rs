//! HTTP service binary for dockdock.

use clap::Parser;
use dockdock::{Server, ServiceConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// DockDockGo: search GitHub for repositories with a docker-compose.yml.
#[derive(Parser)]
#[command(name = "dockdock", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind, overriding config and environment.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding config and environment.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => ServiceConfig::from_file(path)?,
        None => {
            let path = ServiceConfig::default_config_path();
            if path.exists() {
                ServiceConfig::from_file(&path)?
            } else {
                ServiceConfig::default()
            }
        }
    };
    config.apply_env_overrides()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    // RUST_LOG wins; otherwise keep dependency logs quiet.
    let level = config.log_level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "dockdock={level},dockdock_search={level},tower_http=info,hyper=warn,reqwest=warn"
            ))
        }))
        .init();

    info!(
        "{} v{} (upstream {})",
        config.app_name,
        config.app_version,
        config.search.base_url()
    );
    if config.search.token.is_none() {
        info!("no GITHUB_TOKEN set, unauthenticated rate limits apply");
    }

    let server = Server::start(&config).await?;

    tokio::select! {
        served = server.join() => served?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}
