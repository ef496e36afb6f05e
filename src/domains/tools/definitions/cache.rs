//! Cache introspection tool.
//!
//! Shows what the broker currently holds per category without fetching.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{category_scope, parse_params, structured_result};
use crate::domains::open_data::{Broker, CacheEntry, DataCategory};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the cache introspection tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ShowCachedDataParams {
    /// Category to show, or "all".
    #[serde(default, alias = "resource_type")]
    #[schemars(description = "One of parking, smoking_area, restaurant, cctv, or all (default: all)")]
    pub category: Option<String>,
}

/// State of one cache slot.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CacheSlot<'a> {
    Cached {
        age_secs: i64,
        #[serde(flatten)]
        entry: &'a CacheEntry,
    },
    Empty {
        category: DataCategory,
    },
}

impl<'a> CacheSlot<'a> {
    fn new(category: DataCategory, entry: Option<&'a CacheEntry>) -> Self {
        match entry {
            Some(entry) => Self::Cached {
                age_secs: entry.age_secs(),
                entry,
            },
            None => Self::Empty { category },
        }
    }

    fn summary_line(&self) -> String {
        match self {
            Self::Cached { age_secs, entry } => format!(
                "{}: {} records cached {}s ago{}",
                entry.category,
                entry.records.len(),
                age_secs,
                entry
                    .query_used
                    .as_deref()
                    .map(|q| format!(" (loaded by query '{q}')"))
                    .unwrap_or_default()
            ),
            Self::Empty { category } => format!("{category}: no cached data"),
        }
    }
}

#[derive(Debug, Serialize)]
struct CacheReport<'a> {
    categories: Vec<CacheSlot<'a>>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Cache introspection tool.
pub struct ShowCachedDataTool;

impl ShowCachedDataTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "show_cached_data";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Show the data currently cached for one category or all of them, with its age and the query that loaded it. Never contacts the upstream API.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub fn execute(
        params: &ShowCachedDataParams,
        broker: &Broker,
    ) -> Result<CallToolResult, McpError> {
        let categories = category_scope(params.category.as_deref())?;
        info!("Show cached data called for {} categories", categories.len());

        let entries: Vec<(DataCategory, Option<Arc<CacheEntry>>)> =
            if categories == DataCategory::ALL {
                broker.cache().snapshot()
            } else {
                categories
                    .into_iter()
                    .map(|category| (category, broker.cached(category)))
                    .collect()
            };

        let slots: Vec<CacheSlot<'_>> = entries
            .iter()
            .map(|(category, entry)| CacheSlot::new(*category, entry.as_deref()))
            .collect();

        let summary = slots
            .iter()
            .map(CacheSlot::summary_line)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(if let [slot] = slots.as_slice() {
            structured_result(summary, slot)
        } else {
            structured_result(summary, CacheReport { categories: slots })
        })
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn http_handler(
        arguments: serde_json::Value,
        broker: Arc<Broker>,
    ) -> Result<serde_json::Value, String> {
        let params: ShowCachedDataParams =
            parse_params(arguments).map_err(|e| e.message.to_string())?;
        let result = Self::execute(&params, &broker).map_err(|e| e.message.to_string())?;
        Ok(super::common::to_http_value(result))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ShowCachedDataParams>(),
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
                let params: ShowCachedDataParams = parse_params(serde_json::Value::Object(args))?;
                Self::execute(&params, &broker)
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::open_data::testing::{ScriptedUpstream, broker_with, envelope, parking_item};
    use serde_json::json;

    fn params(category: Option<&str>) -> ShowCachedDataParams {
        ShowCachedDataParams {
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_cache_reports_every_category() {
        let upstream = ScriptedUpstream::serving(envelope(vec![], 0));
        let broker = broker_with(upstream.clone());

        let result = ShowCachedDataTool::execute(&params(None), &broker).unwrap();
        let structured = result.structured_content.unwrap();
        let categories = structured["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 4);
        assert!(categories.iter().all(|slot| slot["status"] == "empty"));
        assert_eq!(categories[1]["category"], "smoking_area");
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn test_single_category_shows_entry() {
        let upstream =
            ScriptedUpstream::serving(envelope(vec![parking_item("세종시청 주차장", "세종")], 1));
        let broker = broker_with(upstream.clone());
        broker.read_resource(DataCategory::Parking).await.unwrap();

        let result = ShowCachedDataTool::execute(&params(Some("parking")), &broker).unwrap();
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["status"], "cached");
        assert_eq!(structured["category"], "parking");
        assert_eq!(structured["total_count"], 1);
        assert_eq!(structured["records"][0]["name"], "세종시청 주차장");
        assert!(structured["fetched_at"].is_string());
        assert_eq!(structured["query_used"], json!(null));
        assert_eq!(upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_all_categories_report_cached_slots() {
        let upstream =
            ScriptedUpstream::serving(envelope(vec![parking_item("세종시청 주차장", "세종")], 1));
        let broker = broker_with(upstream);
        broker.read_resource(DataCategory::Cctv).await.unwrap();

        let result = ShowCachedDataTool::execute(&params(Some("all")), &broker).unwrap();
        let structured = result.structured_content.unwrap();
        let categories = structured["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 4);
        assert_eq!(categories[3]["status"], "cached");
        assert_eq!(categories[3]["category"], "cctv");
        assert_eq!(categories[0]["status"], "empty");
    }

    #[test]
    fn test_unknown_category_is_invalid_params() {
        let upstream = ScriptedUpstream::serving(envelope(vec![], 0));
        let broker = broker_with(upstream);
        assert!(ShowCachedDataTool::execute(&params(Some("weather")), &broker).is_err());
    }

    #[test]
    fn test_resource_type_alias() {
        let params: ShowCachedDataParams = parse_params(json!({"resource_type": "all"})).unwrap();
        assert_eq!(params.category.as_deref(), Some("all"));
    }
}
