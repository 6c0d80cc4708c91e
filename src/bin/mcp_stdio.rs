#[cfg(feature = "mcp-server")]
use fusion_lib::run_mcp_stdio;

/// Workspace tools over stdio for MCP clients that spawn a process.
///
/// ```json
/// {
///   "mcpServers": {
///     "fusion": {
///       "command": "/path/to/mcp-stdio",
///       "env": { "FUSION_TOKEN_FILE": "/path/to/token.json" }
///     }
///   }
/// }
/// ```
///
/// `FUSION_LOG` sets the log filter; logs are written to stderr.
#[cfg(feature = "mcp-server")]
#[tokio::main]
async fn main() {
    if let Err(err) = run_mcp_stdio().await {
        eprintln!("[fusion::mcp-stdio] Runtime failed: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "mcp-server"))]
fn main() {
    eprintln!(
        "[fusion::mcp-stdio] Build with `--features mcp-server` to enable the MCP stdio bridge."
    );
    std::process::exit(1);
}
