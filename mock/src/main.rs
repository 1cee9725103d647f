use anyhow::Context;
use bddtrace_mock::{build_router, DEFAULT_ADDR};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Canned MCP endpoint for local development")]
struct MockCli {
    /// Address to listen on
    #[arg(long, env = "MOCK_MCP_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = MockCli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let listener = TcpListener::bind(&cli.addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.addr))?;
    tracing::info!(addr = %listener.local_addr()?, "mock MCP listening");

    axum::serve(listener, build_router())
        .await
        .context("mock MCP server stopped")?;
    Ok(())
}
