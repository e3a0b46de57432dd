use std::io;

use agentmem_mcp::logging::init_logging;
use agentmem_mcp::{McpServer, ServerConfig};

fn main() -> io::Result<()> {
    let config = ServerConfig::from_env();
    init_logging(&config.log_filter);
    tracing::info!(data_dir = %config.data_dir.display(), "starting agentmemd");

    let server = McpServer::from_config(&config);
    server.serve_stdio()
}
