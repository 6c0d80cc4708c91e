// Interfaces exposed by optional adapters (MCP transports).
//
// Each submodule is feature-gated by the capability it implements.
#[cfg(feature = "mcp-server")]
pub mod mcp;
