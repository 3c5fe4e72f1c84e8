//! poly-git MCP server
//!
//! Exposes GitHub, GitLab, Gitea and Bitbucket operations as MCP tools.
//!
//! # Usage
//!
//! ```bash
//! poly-git-mcp [--config <path>] [--adapters github,gitlab] [--allow-collisions]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Extra log directives (default level for this server: `info`)
//! - `BITBUCKET_USERNAME`, `BITBUCKET_APP_PASSWORD`: Bitbucket credentials
//!
//! # Protocol
//!
//! JSON-RPC 2.0 in Content-Length frames over stdio:
//! - Requests arrive on stdin, responses go to stdout
//! - Logs go to stderr

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use poly_git_mcp::{LOG_TARGETS, ServerConfig, build_session};
use tracing_subscriber::EnvFilter;

/// MCP server for Git forges
#[derive(Parser)]
#[command(name = "poly-git-mcp")]
#[command(about = "MCP server for GitHub, GitLab, Gitea and Bitbucket")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Adapters to enable, in routing order (overrides the config file)
    #[arg(long, value_delimiter = ',')]
    adapters: Option<Vec<String>>,

    /// Start even if two adapters expose the same tool name
    #[arg(long)]
    allow_collisions: bool,

    /// Log level for the server's own crates
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // stdout is reserved for the protocol
    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        filter = filter.add_directive(format!("{}={}", target, args.log_level).parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "poly-git-mcp failed");
        return Err(e.into());
    }

    Ok(())
}

async fn run(args: Args) -> poly_git_mcp::Result<()> {
    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_overrides(args.adapters, args.allow_collisions);

    tracing::info!(config = ?args.config, adapters = ?config.adapters, "Starting poly-git-mcp");

    let session = build_session(&config)?;
    poly_git_core::serve_stdio(Arc::new(session)).await?;
    Ok(())
}
