use std::io;

use summary_mcp::{init_tracing, McpServer, ServerConfig};

fn main() -> io::Result<()> {
    let config = ServerConfig::from_env();
    init_tracing(&config.log_level);

    let server = McpServer::with_config(&config);
    match server.default_storage_dir() {
        Some(dir) => tracing::info!(storage_dir = %dir.display(), "summary-always mcp server ready on stdio"),
        None => tracing::warn!("summary-always mcp server ready on stdio; no storage directory resolved"),
    }
    server.serve_stdio()
}
