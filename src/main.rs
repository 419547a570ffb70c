use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use contextrecord::config::ContextRecordConfig;
use contextrecord::{cli, server};

#[derive(Parser)]
#[command(
    name = "contextrecord",
    version,
    about = "Conversation recording service with MCP tools, HTTP API and live events"
)]
struct Cli {
    /// Config file to load instead of ~/.contextrecord/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server on the configured transport (stdio by default)
    Serve,
    /// Start the HTTP API with SSE events and MCP at /mcp
    ServeHttp {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Search recorded conversations by keyword
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show the most recent conversations
    Recent {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show conversation statistics
    Stats,
    /// Check database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ContextRecordConfig::load_from(path)?,
        None => ContextRecordConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    for notice in &config.notices {
        notice.log();
    }

    match cli.command {
        Command::Serve => {
            let transport = config.server.transport.clone();
            match transport.as_str() {
                "http" => server::serve_http(config).await?,
                "stdio" => server::serve_stdio(config).await?,
                other => {
                    anyhow::bail!("unknown transport {other:?} (expected \"stdio\" or \"http\")")
                }
            }
        }
        Command::ServeHttp { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve_http(config).await?;
        }
        Command::Search { query, limit } => cli::search::search(&config, &query, limit)?,
        Command::Recent { limit } => cli::recent::recent(&config, limit)?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
