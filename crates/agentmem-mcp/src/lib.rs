pub mod config;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod tool;
pub mod tools;

pub use config::{ServerConfig, ServerInfo};
pub use server::McpServer;
pub use tool::{Tool, ToolDescriptor, ToolError, ToolRegistry};
