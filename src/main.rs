use anyhow::Result;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cache;
mod error;
mod service;
mod upstream;
use service::DocsCacheService;
use upstream::HttpFetcher;

/// MCP server that fronts a documentation provider with a persistent local cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom cache directory path (defaults to ~/.docs-cache-mcp/docs)
    #[arg(long, env = "DOCS_CACHE_MCP_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// HTTP endpoint of the upstream documentation provider
    #[arg(
        long,
        env = "DOCS_CACHE_MCP_UPSTREAM_URL",
        default_value = "https://mcp.context7.com/mcp"
    )]
    upstream_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing to stderr to avoid conflicts with stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting docs cache MCP server on stdio...");
    if let Some(ref cache_dir) = args.cache_dir {
        tracing::info!("Using custom cache directory: {}", cache_dir.display());
    }
    tracing::info!("Upstream provider endpoint: {}", args.upstream_url);

    let fetcher = Arc::new(HttpFetcher::new(args.upstream_url));
    let docs_cache_service = DocsCacheService::new(args.cache_dir, fetcher)?;

    // Serve using stdio transport
    let service = docs_cache_service.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;
    Ok(())
}
