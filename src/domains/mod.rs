//! Domains module containing business logic organized by bounded contexts.
//!
//! Each subdomain represents a specific area of functionality within the MCP
//! server. `open_data` owns the datasets; `tools` and `resources` expose them
//! over MCP.

pub mod open_data;
pub mod resources;
pub mod tools;
