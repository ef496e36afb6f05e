//! Sejong City open-data MCP server.
//!
//! This crate exposes four public datasets of Sejong City (parking lots,
//! smoking areas, certified restaurants and CCTV installations) over the
//! Model Context Protocol. Each dataset is readable as a resource and
//! searchable through keyword tools backed by a per-category cache.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling, and the main server
//! - **domains**: Business logic organized by bounded contexts
//!   - **open_data**: Upstream client, record normalization, cache and query broker
//!   - **tools**: MCP tools that can be executed by clients
//!   - **resources**: Data resources that can be read by clients
//!
//! # Example
//!
//! ```rust,no_run
//! use openapi_korea_mcp::{core::McpServer, core::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
