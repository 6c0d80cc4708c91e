use std::sync::Arc;

use tracing::warn;

pub mod application;
pub mod domain;
pub mod infrastructure;
#[cfg(feature = "mcp-server")]
pub mod interfaces;
pub mod settings;

use application::{CapabilityRegistry, Dispatcher, Workspace};
use infrastructure::google::AccessTokenProvider;
use infrastructure::{
    FileTokenSource, GmailClient, GoogleClient, GoogleDocsClient, GoogleDriveClient,
    GoogleKeepClient, GoogleSheetsClient,
};
use settings::AppConfig;

#[cfg(feature = "mcp-server")]
use anyhow::{Context, Result};
#[cfg(feature = "mcp-server")]
use interfaces::mcp::{McpEndpointMetadata, McpRuntime, McpServerConfig};
#[cfg(feature = "mcp-server")]
use tracing::info;

/// Wire the token source, provider clients and registry into a dispatcher.
pub fn build_dispatcher(config: &AppConfig) -> Dispatcher {
    if !config.token_file.exists() {
        warn!(
            target: "fusion::google",
            path = %config.token_file.display(),
            "token file not found; tool calls will fail until it is created"
        );
    }

    let tokens: Arc<dyn AccessTokenProvider> = Arc::new(FileTokenSource::new(
        &config.token_file,
        &config.credentials_file,
    ));
    let client = Arc::new(GoogleClient::new(tokens));

    let workspace = Workspace::new(
        Arc::new(GoogleDocsClient::new(Arc::clone(&client))),
        Arc::new(GoogleSheetsClient::new(Arc::clone(&client))),
        Arc::new(GoogleDriveClient::new(Arc::clone(&client))),
        Arc::new(GoogleKeepClient::new(Arc::clone(&client))),
        Arc::new(GmailClient::new(client)),
        config.default_max_results,
    );

    Dispatcher::new(CapabilityRegistry::workspace_tools(), workspace)
}

#[cfg(feature = "mcp-server")]
pub async fn run_mcp_bridge(config: Option<AppConfig>) -> Result<()> {
    init_tracing();

    let config = match config {
        Some(config) => config,
        None => AppConfig::load().context("failed to load configuration")?,
    };
    let server_config = McpServerConfig::from_app_config(&config)?;
    let dispatcher = Arc::new(build_dispatcher(&config));

    println!(
        "Starting Fusion Google Services MCP server on port {}",
        config.port
    );

    let runtime = McpRuntime::start(dispatcher, server_config)
        .await
        .context("failed to start MCP runtime")?;

    log_mcp_startup(runtime.metadata());
    println!("SSE endpoint: {}", runtime.metadata().sse_url());
    println!("Message endpoint: {}", runtime.metadata().post_url());
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    runtime.shutdown();
    println!("Server stopped.");
    Ok(())
}

/// Run the MCP server over stdin/stdout. Logs go to stderr only.
#[cfg(feature = "mcp-server")]
pub async fn run_mcp_stdio() -> Result<()> {
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;
    let dispatcher = Arc::new(build_dispatcher(&config));

    interfaces::mcp::run_mcp_stdio_server(dispatcher)
        .await
        .context("MCP stdio server failed")?;

    Ok(())
}

#[cfg(feature = "mcp-server")]
fn log_mcp_startup(metadata: &McpEndpointMetadata) {
    let sse_url = metadata.sse_url();
    let post_url = metadata.post_url();
    info!(
        target: "fusion::mcp",
        bind = %metadata.bind_addr,
        sse = %sse_url,
        post = %post_url,
        "MCP runtime listening"
    );
}

#[cfg(feature = "mcp-server")]
fn init_tracing() {
    init_tracing_with_writer(std::io::stderr);
}

#[cfg(feature = "mcp-server")]
fn init_tracing_with_writer<W>(make_writer: fn() -> W)
where
    W: std::io::Write + Send + Sync + 'static,
{
    static INIT: std::sync::OnceLock<()> = std::sync::OnceLock::new();

    let _ = INIT.get_or_init(|| {
        let filter = std::env::var("FUSION_LOG").unwrap_or_else(|_| "info".into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(make_writer)
            .compact()
            .try_init();
    });
}
