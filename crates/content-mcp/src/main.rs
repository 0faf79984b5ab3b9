//! Content MCP Server
//!
//! # Usage
//!
//! ```bash
//! content-mcp [--config <path>] [--memory]
//! ```
//!
//! Without `--config`, connection settings come from `CONTENT_PROJECT_ID`,
//! `CONTENT_DATASET` and `CONTENT_API_TOKEN`. `--memory` serves from an
//! in-process store instead of the remote API.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `content_mcp=info,content_core=info`)
//!
//! Logs go to stderr; stdout carries the protocol.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use content_core::{ClientConfig, ContentStore, DocumentService, MemoryStore};
use content_http::HttpStore;
use content_mcp::ContentMcpServer;

/// MCP server for document publishing and release versioning
#[derive(Parser)]
#[command(name = "content-mcp")]
#[command(about = "MCP server for document publishing and release versioning")]
#[command(version)]
struct Args {
    /// Path to a TOML client configuration
    #[arg(short, long, env = "CONTENT_CONFIG")]
    config: Option<PathBuf>,

    /// Serve from an in-memory store instead of the remote API
    #[arg(long)]
    memory: bool,
}

fn load_config(args: &Args) -> content_core::Result<ClientConfig> {
    match (&args.config, args.memory) {
        (Some(path), _) => ClientConfig::load(path),
        (None, true) => {
            let mut config = ClientConfig::new("local", "memory");
            config.apply_env();
            config.validate()?;
            Ok(config)
        }
        (None, false) => ClientConfig::from_env(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_mcp=info".parse()?)
                .add_directive("content_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let store: Arc<dyn ContentStore> = if args.memory {
        tracing::info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!(host = %config.api_base_url(), "Using remote store");
        Arc::new(HttpStore::new(Arc::new(config.clone())))
    };

    tracing::info!(
        project = %config.project_id,
        dataset = %config.dataset,
        "Starting content-mcp server"
    );

    let mut server = ContentMcpServer::new(DocumentService::new(store, config));
    server.run().await?;

    Ok(())
}
