//! anime-helper MCP server.

use anime_helper::{AnimeHelperServer, AnimeTools};
use anyhow::{Context, Result};
use clap::Parser;
use shared::{Config, LogConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the effective configuration to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.write_default_config {
        config
            .save(&args.config)
            .with_context(|| format!("Failed to write config to {}", args.config.display()))?;
        eprintln!("Configuration written to {}", args.config.display());
        return Ok(());
    }

    // Initialize logging; stdout is reserved for the MCP stream
    let mut log_config = LogConfig::from_settings("anime-helper", &config.logging);
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!("anime-helper starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    let tools = AnimeTools::from_config(&config).context("Failed to create upstream clients")?;
    let server = AnimeHelperServer::new(tools);

    // Serve over stdio until the client disconnects
    let transport = rmcp::transport::io::stdio();
    let service = rmcp::serve_server(server, transport)
        .await
        .context("Failed to start MCP server")?;
    info!("MCP server ready on stdio");

    service.waiting().await.context("MCP server stopped")?;

    info!("anime-helper finished");
    Ok(())
}
