//! MCP stdio server entry point.
//!
//! Reads one JSON-RPC message per line from stdin and writes replies to stdout, so
//! all logging goes to stderr.

mod service;
mod tools;

use anyhow::Context as _;
use clap::Parser;
use rmcp::model::ClientJsonRpcMessage;
use specscope_explorer::cache::SchemaCache;
use specscope_explorer::explorer::Explorer;
use specscope_explorer::registry::{ApiRegistry, default_registry_path};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};

#[derive(Debug, Parser)]
#[command(
    name = "specscope",
    about = "MCP stdio server for exploring OpenAPI/Swagger API schemas"
)]
struct Args {
    /// Path of the saved-API registry file.
    #[arg(long, env = "SPECSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Timeout for schema fetches, in seconds.
    #[arg(long, env = "SPECSCOPE_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    http_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let registry_path = match args.config {
        Some(path) => path,
        None => default_registry_path().context("resolve registry path")?,
    };
    tracing::info!("Using registry at {}", registry_path.display());

    let registry = Arc::new(ApiRegistry::load(registry_path));
    let cache = Arc::new(SchemaCache::new(Duration::from_secs(args.http_timeout_secs)));
    let service = service::ExplorerService::new(Arc::new(Explorer::new(registry, cache)));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message: ClientJsonRpcMessage = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Skipping malformed message: {e}");
                continue;
            }
        };

        if let Some(reply) = service.handle_message(message).await {
            let mut out = serde_json::to_vec(&reply).context("serialize reply")?;
            out.push(b'\n');
            stdout.write_all(&out).await.context("write stdout")?;
            stdout.flush().await.context("flush stdout")?;
        }
    }

    Ok(())
}
