pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;

pub use config::ServerConfig;
pub use error::ToolError;
pub use logging::init_tracing;
pub use server::McpServer;
