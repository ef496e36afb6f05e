//! Refresh tool: reload one category or all of them from the upstream.

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

use super::common::{category_scope, parse_params, structured_error, structured_result};
use crate::domains::open_data::{Broker, DataCategory, ErrorEnvelope};

/// Parameters for the refresh tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct RefreshDataParams {
    /// Category to refresh, or "all".
    #[serde(default, alias = "resource_type")]
    #[schemars(description = "One of parking, smoking_area, restaurant, cctv, or all (default: all)")]
    pub category: Option<String>,
}

/// Outcome of refreshing one category.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RefreshOutcome {
    Refreshed {
        category: DataCategory,
        record_count: usize,
        total_count: usize,
        fetched_at: chrono::DateTime<chrono::Utc>,
    },
    Failed {
        #[serde(flatten)]
        error: ErrorEnvelope,
    },
}

impl RefreshOutcome {
    fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn summary_line(&self) -> String {
        match self {
            Self::Refreshed {
                category,
                record_count,
                ..
            } => format!("{category}: refreshed, {record_count} records"),
            Self::Failed { error } => {
                format!("{}: refresh failed ({})", error.category, error.error_kind)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct RefreshReport {
    categories: Vec<RefreshOutcome>,
}

/// Refresh tool definition.
pub struct RefreshDataTool;

impl RefreshDataTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "refresh_data";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Reload the complete dataset of one category, or of all categories, from the Sejong open-data API and replace the cache. A failed refresh keeps the previous cache entry.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub async fn execute(
        params: &RefreshDataParams,
        broker: &Broker,
    ) -> Result<CallToolResult, McpError> {
        let categories = category_scope(params.category.as_deref())?;
        info!("Refreshing {} categories", categories.len());

        let results = if categories == DataCategory::ALL {
            broker.refresh_all().await
        } else {
            broker.refresh_many(&categories).await
        };

        let outcomes: Vec<RefreshOutcome> = results
            .into_iter()
            .map(|(_, result)| match result {
                Ok(entry) => RefreshOutcome::Refreshed {
                    category: entry.category,
                    record_count: entry.records.len(),
                    total_count: entry.total_count,
                    fetched_at: entry.fetched_at,
                },
                Err(error) => RefreshOutcome::Failed { error },
            })
            .collect();

        let failed = outcomes.iter().any(RefreshOutcome::is_failure);
        let summary = outcomes
            .iter()
            .map(RefreshOutcome::summary_line)
            .collect::<Vec<_>>()
            .join("\n");
        let report = RefreshReport {
            categories: outcomes,
        };

        Ok(if failed {
            structured_error(summary, report)
        } else {
            structured_result(summary, report)
        })
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        broker: Arc<Broker>,
    ) -> Result<serde_json::Value, String> {
        let params: RefreshDataParams =
            parse_params(arguments).map_err(|e| e.message.to_string())?;
        let result = Self::execute(&params, &broker)
            .await
            .map_err(|e| e.message.to_string())?;
        Ok(super::common::to_http_value(result))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<RefreshDataParams>(),
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
                let params: RefreshDataParams = parse_params(serde_json::Value::Object(args))?;
                Self::execute(&params, &broker).await
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::open_data::testing::{ScriptedUpstream, broker_with, envelope, parking_item};
    use crate::domains::open_data::{FetchError, UpstreamResponse};

    #[tokio::test]
    async fn test_refresh_single_category() {
        let upstream = ScriptedUpstream::serving(envelope(vec![parking_item("A", "세종")], 1));
        let broker = broker_with(upstream.clone());
        broker.read_resource(DataCategory::Parking).await.unwrap();

        let params = RefreshDataParams {
            category: Some("parking".to_string()),
        };
        let result = RefreshDataTool::execute(&params, &broker).await.unwrap();

        assert_eq!(result.is_error, Some(false));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["categories"][0]["status"], "refreshed");
        assert_eq!(structured["categories"][0]["record_count"], 1);
        assert_eq!(upstream.call_count(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported() {
        let upstream = ScriptedUpstream::new(|url| {
            if url.contains("sjRegularRestaurant") {
                Err(FetchError::transport("connection reset"))
            } else {
                Ok(UpstreamResponse::ok(envelope(vec![], 0).to_string()))
            }
        });
        let broker = broker_with(upstream);

        let result = RefreshDataTool::execute(&RefreshDataParams::default(), &broker)
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.unwrap();
        let categories = structured["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 4);
        assert_eq!(categories[2]["status"], "failed");
        assert_eq!(categories[2]["error_kind"], "transport_error");
        assert_eq!(categories[0]["status"], "refreshed");
    }

    #[tokio::test]
    async fn test_unknown_category_is_invalid_params() {
        let upstream = ScriptedUpstream::serving(envelope(vec![], 0));
        let broker = broker_with(upstream.clone());
        let params = RefreshDataParams {
            category: Some("weather".to_string()),
        };
        assert!(RefreshDataTool::execute(&params, &broker).await.is_err());
        assert_eq!(upstream.call_count(), 0);
    }
}
