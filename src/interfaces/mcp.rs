use std::{
    net::{SocketAddr, ToSocketAddrs},
    sync::Arc,
    time::Duration,
};

use anyhow::{anyhow, Context as AnyhowContext, Result};
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::sse_server::{SseServer, SseServerConfig},
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde_json::{json, Map, Value};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::{Dispatcher, ToolOutput};
use crate::settings::AppConfig;

/// Static metadata describing the active MCP endpoints.
#[derive(Debug, Clone)]
pub struct McpEndpointMetadata {
    pub bind_addr: SocketAddr,
    pub sse_path: String,
    pub post_path: String,
}

impl McpEndpointMetadata {
    pub fn post_url(&self) -> String {
        format!("http://{}{}", self.bind_addr, self.post_path)
    }

    pub fn sse_url(&self) -> String {
        format!("http://{}{}", self.bind_addr, self.sse_path)
    }
}

/// Runtime configuration for the MCP SSE server.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    pub bind_addr: SocketAddr,
    pub sse_path: String,
    pub post_path: String,
    pub keep_alive: Duration,
}

impl McpServerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let bind_addr = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?
            .next()
            .ok_or_else(|| anyhow!("no address for host {}", config.host))?;

        Ok(Self {
            bind_addr,
            sse_path: normalize_path(&config.sse_path),
            post_path: normalize_path(&config.post_path),
            keep_alive: Duration::from_secs(config.keep_alive_secs.max(5)),
        })
    }

    fn into_pair(self, cancel_token: CancellationToken) -> (SseServerConfig, McpEndpointMetadata) {
        (
            SseServerConfig {
                bind: self.bind_addr,
                sse_path: self.sse_path.clone(),
                post_path: self.post_path.clone(),
                ct: cancel_token,
                sse_keep_alive: Some(self.keep_alive),
            },
            McpEndpointMetadata {
                bind_addr: self.bind_addr,
                sse_path: self.sse_path,
                post_path: self.post_path,
            },
        )
    }
}

fn normalize_path(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return "/".into();
    }
    if trimmed.starts_with('/') {
        trimmed.into()
    } else {
        format!("/{}", trimmed)
    }
}

/// Handle to the background MCP server. Dropping the handle shuts it down.
#[derive(Clone)]
pub struct McpServerHandle {
    root_token: CancellationToken,
    worker_token: CancellationToken,
    metadata: Arc<McpEndpointMetadata>,
}

impl McpServerHandle {
    pub fn shutdown(&self) {
        self.worker_token.cancel();
        self.root_token.cancel();
    }

    pub fn metadata(&self) -> &McpEndpointMetadata {
        &self.metadata
    }
}

impl Drop for McpServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Boot an MCP SSE server exposing every registered workspace tool.
pub async fn spawn_mcp_server(
    dispatcher: Arc<Dispatcher>,
    config: McpServerConfig,
) -> Result<McpServerHandle> {
    let root_token = CancellationToken::new();
    let (sse_config, metadata) = config.into_pair(root_token.clone());

    let sse_server = SseServer::serve_with_config(sse_config)
        .await
        .context("failed to bind MCP SSE listener")?;

    let worker_token =
        sse_server.with_service(move || FusionMcpServer::new(Arc::clone(&dispatcher)));

    Ok(McpServerHandle {
        root_token,
        worker_token,
        metadata: Arc::new(metadata),
    })
}

pub struct McpRuntime {
    handle: McpServerHandle,
}

impl McpRuntime {
    pub async fn start(dispatcher: Arc<Dispatcher>, config: McpServerConfig) -> Result<Self> {
        let handle = spawn_mcp_server(dispatcher, config).await?;
        Ok(Self { handle })
    }

    pub fn metadata(&self) -> &McpEndpointMetadata {
        self.handle.metadata()
    }

    pub fn shutdown(self) {
        self.handle.shutdown();
    }
}

#[derive(Clone)]
pub struct FusionMcpServer {
    dispatcher: Arc<Dispatcher>,
}

impl FusionMcpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .capabilities()
            .map(|capability| {
                Tool::new(
                    capability.name,
                    capability.description,
                    Arc::clone(&capability.input_schema),
                )
            })
            .collect()
    }

    async fn run_tool(
        &self,
        name: String,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let output = task::spawn_blocking(move || dispatcher.dispatch(&name, arguments))
            .await
            .map_err(|err| internal_error(err.to_string()))?;
        Ok(into_call_result(output))
    }
}

fn into_call_result(output: ToolOutput) -> CallToolResult {
    let content = vec![Content::text(output.text)];
    if output.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for FusionMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: rmcp::model::Implementation {
                name: "fusion-google-services".into(),
                title: Some("Fusion Google Services".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for Google Docs, Sheets, Drive, Keep and Gmail. \
                 Every tool returns plain text; failures start with \"Error:\"."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        debug!(target: "fusion::mcp", tool = %request.name, "tool call received");
        self.run_tool(request.name.into_owned(), request.arguments)
            .await
    }
}

fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(
        "internal MCP server error",
        Some(json!({ "detail": message.into() })),
    )
}

/// Serve the registry over stdin/stdout for process-spawning MCP clients.
pub async fn run_mcp_stdio_server(dispatcher: Arc<Dispatcher>) -> Result<()> {
    info!(target: "fusion::mcp", "Starting MCP stdio server...");

    let service = FusionMcpServer::new(dispatcher)
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to initialise MCP stdio session")?;
    let reason = service
        .waiting()
        .await
        .context("MCP stdio session aborted")?;

    info!(target: "fusion::mcp", ?reason, "MCP stdio server terminated");
    Ok(())
}
