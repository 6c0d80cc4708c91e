#[cfg(feature = "mcp-server")]
use fusion_lib::run_mcp_bridge;

#[cfg(feature = "mcp-server")]
#[tokio::main]
async fn main() {
    if let Err(err) = run_mcp_bridge(None).await {
        eprintln!("[fusion::mcp-bridge] startup failed: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "mcp-server"))]
fn main() {
    eprintln!(
        "[fusion::mcp-bridge] build with `--features mcp-server` to enable the MCP bridge binary."
    );
    std::process::exit(1);
}
