//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)
//! - Tool metadata for listing

use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

use super::definitions::{CategorySearchTool, RefreshDataTool, SearchDataTool, ShowCachedDataTool};
use crate::domains::open_data::{Broker, DataCategory};

#[cfg(feature = "http")]
use super::ToolError;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    broker: Arc<Broker>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(broker: Arc<Broker>) -> Self {
        Self { broker }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        DataCategory::ALL
            .into_iter()
            .map(CategorySearchTool::name)
            .chain([
                SearchDataTool::NAME,
                ShowCachedDataTool::NAME,
                RefreshDataTool::NAME,
            ])
            .collect()
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        DataCategory::ALL
            .into_iter()
            .map(CategorySearchTool::to_tool)
            .chain([
                SearchDataTool::to_tool(),
                ShowCachedDataTool::to_tool(),
                RefreshDataTool::to_tool(),
            ])
            .collect()
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    ///
    /// This is used by the HTTP transport to call tools.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let broker = self.broker.clone();
        let result = match name {
            SearchDataTool::NAME => SearchDataTool::http_handler(arguments, broker).await,
            ShowCachedDataTool::NAME => ShowCachedDataTool::http_handler(arguments, broker),
            RefreshDataTool::NAME => RefreshDataTool::http_handler(arguments, broker).await,
            _ => match DataCategory::ALL.into_iter().find(|c| c.tool_name() == name) {
                Some(category) => {
                    CategorySearchTool::http_handler(category, arguments, broker).await
                }
                None => {
                    warn!("Unknown tool requested: {}", name);
                    return Err(ToolError::not_found(name));
                }
            },
        };

        result.map_err(ToolError::invalid_arguments)
    }
}
