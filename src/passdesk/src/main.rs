//! Passdesk: multi-tenant loyalty program administration backend.
//!
//! Main entry point that loads configuration and starts the server.

use clap::Parser;
use passdesk_api::ApiServer;
use passdesk_core::config::AppConfig;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "passdesk")]
#[command(about = "Multi-tenant loyalty program administration backend")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "PASSDESK__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "PASSDESK__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Metrics port (overrides config)
    #[arg(long, env = "PASSDESK__METRICS__PORT")]
    metrics_port: Option<u16>,

    /// Seed a demo tenant with sample members
    #[arg(long, default_value_t = false)]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passdesk=info,passdesk_api=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Passdesk starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.metrics.port = port;
    }
    if cli.demo {
        config.demo.enabled = true;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        demo = config.demo.enabled,
        "Configuration loaded"
    );

    let api_server = ApiServer::new(config)?;

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Passdesk is ready to serve traffic");

    api_server.start_http().await?;

    Ok(())
}
