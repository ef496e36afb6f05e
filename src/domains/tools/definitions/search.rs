//! Category search tools.
//!
//! One tool per category (`sejong_parking_search`, ...) plus the generic
//! `search_data` tool taking the category as an argument. Both filter the
//! complete dataset and paginate the matches.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{envelope_result, invalid_params, parse_params};
use crate::domains::open_data::{Broker, DEFAULT_PAGE_SIZE, DataCategory, SearchQuery};

fn default_page_index() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for a category search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CategorySearchParams {
    /// Keyword matched against names and addresses. Empty returns every record.
    #[serde(default)]
    #[schemars(description = "Keyword matched against name/address fields (case-insensitive). Omit to list everything.")]
    pub keyword: Option<String>,

    /// 1-based page number.
    #[serde(default = "default_page_index")]
    #[schemars(description = "Page number, starting at 1 (default: 1)")]
    pub page_index: u32,

    /// Records per page.
    #[serde(default = "default_page_size")]
    #[schemars(description = "Records per page, 1 to 100 (default: 20)")]
    pub page_size: u32,
}

/// Parameters for the generic search tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchDataParams {
    /// Category to search.
    #[serde(alias = "resource_type")]
    pub category: DataCategory,

    #[serde(flatten)]
    pub search: CategorySearchParams,
}

impl CategorySearchParams {
    fn into_query(self, category: DataCategory) -> Result<SearchQuery, McpError> {
        SearchQuery::new(category, self.keyword, self.page_index, self.page_size)
            .map_err(invalid_params)
    }
}

// ============================================================================
// Per-category tool
// ============================================================================

/// Search tool bound to one category.
pub struct CategorySearchTool;

impl CategorySearchTool {
    /// Tool name as registered in MCP.
    pub fn name(category: DataCategory) -> &'static str {
        category.tool_name()
    }

    /// Tool description shown to clients.
    pub fn description(category: DataCategory) -> &'static str {
        match category {
            DataCategory::Parking => {
                "Search Sejong City parking lots (세종시 주차장) by name or address. Returns capacity, fees, opening hours and coordinates. Keyword matching is done locally over the complete dataset."
            }
            DataCategory::SmokingArea => {
                "Search Sejong City designated smoking areas (세종시 흡연구역) by name or address. Keyword matching is done locally over the complete dataset."
            }
            DataCategory::Restaurant => {
                "Search Sejong City certified restaurants (세종시 음식점) by name, address or main menu. Keyword matching is done locally over the complete dataset."
            }
            DataCategory::Cctv => {
                "Search Sejong City CCTV installations (세종시 CCTV) by address, purpose or managing agency. Keyword matching is done locally over the complete dataset."
            }
        }
    }

    /// Execute the tool logic.
    #[instrument(skip_all, fields(category = %query.category))]
    pub async fn execute(query: SearchQuery, broker: &Broker) -> CallToolResult {
        info!(
            "Search tool called: category={}, keyword={:?}, page={}/{}",
            query.category,
            query.keyword(),
            query.page_index,
            query.page_size
        );
        envelope_result(broker.query(&query).await)
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        category: DataCategory,
        arguments: serde_json::Value,
        broker: Arc<Broker>,
    ) -> Result<serde_json::Value, String> {
        let query = parse_params::<CategorySearchParams>(arguments)
            .and_then(|params| params.into_query(category))
            .map_err(|e| e.message.to_string())?;

        let result = Self::execute(query, &broker).await;
        Ok(super::common::to_http_value(result))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool(category: DataCategory) -> Tool {
        Tool {
            name: Self::name(category).into(),
            description: Some(Self::description(category).into()),
            input_schema: cached_schema_for_type::<CategorySearchParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO transport.
    pub fn create_route<S>(category: DataCategory, broker: Arc<Broker>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(category), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let broker = broker.clone();
            async move {
                let query = parse_params::<CategorySearchParams>(serde_json::Value::Object(args))?
                    .into_query(category)?;
                Ok(Self::execute(query, &broker).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// Generic tool
// ============================================================================

/// Search tool taking the category as an argument.
pub struct SearchDataTool;

impl SearchDataTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "search_data";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Search any Sejong City dataset (parking, smoking_area, restaurant, cctv) by keyword. Same behaviour as the per-category search tools.";

    /// Execute the tool logic.
    pub async fn execute(
        params: SearchDataParams,
        broker: &Broker,
    ) -> Result<CallToolResult, McpError> {
        let query = params.search.into_query(params.category)?;
        Ok(CategorySearchTool::execute(query, broker).await)
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        broker: Arc<Broker>,
    ) -> Result<serde_json::Value, String> {
        let params: SearchDataParams = parse_params(arguments).map_err(|e| e.message.to_string())?;
        let result = Self::execute(params, &broker)
            .await
            .map_err(|e| e.message.to_string())?;
        Ok(super::common::to_http_value(result))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<SearchDataParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO transport.
    pub fn create_route<S>(broker: Arc<Broker>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let broker = broker.clone();
            async move {
                let params: SearchDataParams = parse_params(serde_json::Value::Object(args))?;
                Self::execute(params, &broker).await
            }
            .boxed()
        })
    }
}
