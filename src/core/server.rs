//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to domain-specific services. All services share one
//! [`Broker`], so a resource read and a tool call see the same cache.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/`. Each tool defines:
//! - Parameters struct (for rmcp)
//! - `execute()` method (core logic)
//! - `http_handler()` method (called via ToolRegistry for HTTP transport)
//!
//! The ToolRouter is built dynamically in `domains/tools/router.rs`.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, handler::server::tool::ToolRouter, model::*,
    service::RequestContext, tool_handler,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use crate::domains::{
    open_data::Broker,
    resources::{ResourceError, ResourceService},
    tools::build_tool_router,
};

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

const INSTRUCTIONS: &str = "Sejong City (세종특별자치시) open-data broker. \
Read sejong://{category}/list for a complete dataset, or use the per-category search tools \
(sejong_parking_search, sejong_smoking_area_search, sejong_restaurant_search, sejong_cctv_search) \
to filter by keyword with pagination. Categories: parking, smoking_area, restaurant, cctv. \
Keyword searches reuse cached data; refresh_data reloads it and show_cached_data inspects it.";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp and coordinates
/// between different domain services to handle MCP protocol messages.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared open-data broker.
    broker: Arc<Broker>,

    /// Service for handling resource-related requests.
    resource_service: Arc<ResourceService>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(config: Config) -> super::Result<Self> {
        let broker = Broker::from_config(&config)?;
        Ok(Self::with_broker(config, broker))
    }

    /// Create a server around an existing broker.
    pub fn with_broker(config: Config, broker: Broker) -> Self {
        let config = Arc::new(config);
        let broker = Arc::new(broker);
        let resource_service = Arc::new(ResourceService::new(broker.clone()));

        Self {
            tool_router: build_tool_router::<Self>(broker.clone()),
            config,
            broker,
            resource_service,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the shared broker.
    pub fn broker(&self) -> &Arc<Broker> {
        &self.broker
    }

    /// Server instructions sent on initialize.
    pub fn instructions() -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    ///
    /// This method uses the ToolRegistry to dispatch to the appropriate
    /// tool handler.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let registry = ToolRegistry::new(self.broker.clone());
        registry
            .call_tool(name, arguments)
            .await
            .map_err(|e| e.to_string())
    }

    /// List all available resources (for HTTP transport).
    pub async fn list_resources(&self) -> Vec<serde_json::Value> {
        let resources = self.resource_service.list_resources().await;

        resources
            .into_iter()
            .map(|r| {
                serde_json::json!({
                    "uri": r.raw.uri,
                    "name": r.raw.name,
                    "description": r.raw.description,
                    "mimeType": r.raw.mime_type
                })
            })
            .collect()
    }

    /// Read a resource by URI (for HTTP transport).
    pub async fn read_resource(&self, uri: &str) -> Result<serde_json::Value, String> {
        match self.resource_service.read_resource(uri).await {
            Ok(result) => Ok(serde_json::json!({
                "contents": result.contents
            })),
            Err(e) => Err(e.to_string()),
        }
    }
}

fn resource_error(err: ResourceError) -> McpError {
    match err {
        ResourceError::NotFound(_) => McpError::resource_not_found(err.to_string(), None),
        ResourceError::Serialization(_) => McpError::internal_error(err.to_string(), None),
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        info!("Listing resources");
        let resources = self.resource_service.list_resources().await;
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        info!("Reading resource: {}", request.uri);
        self.resource_service
            .read_resource(&request.uri)
            .await
            .map_err(resource_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::open_data::testing::{ScriptedUpstream, broker_with, envelope, parking_item};

    fn server(upstream: Arc<ScriptedUpstream>) -> McpServer {
        McpServer::with_broker(Config::default(), broker_with(upstream))
    }

    #[test]
    fn test_get_info_capabilities() {
        let server = server(ScriptedUpstream::serving(envelope(vec![], 0)));
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_none());
        assert!(info.instructions.unwrap().contains("sejong://"));
        assert_eq!(info.server_info.name, server.name());
    }

    #[test]
    fn test_list_tools() {
        let server = server(ScriptedUpstream::serving(envelope(vec![], 0)));
        let tools = server.list_tools();
        assert_eq!(tools.len(), 7);
        assert!(tools.iter().any(|t| t["name"] == "sejong_cctv_search"));
    }

    #[tokio::test]
    async fn test_resources_and_tools_share_cache() {
        let upstream = ScriptedUpstream::serving(envelope(vec![parking_item("A", "세종")], 1));
        let server = server(upstream.clone());

        let listed = server.list_resources().await;
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0]["mimeType"], "application/json");

        server.read_resource("sejong://parking/list").await.unwrap();
        assert!(server.broker().cached(crate::domains::open_data::DataCategory::Parking).is_some());
        assert_eq!(upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_read_unknown_resource() {
        let server = server(ScriptedUpstream::serving(envelope(vec![], 0)));
        assert!(server.read_resource("sejong://weather/list").await.is_err());
    }

    #[test]
    fn test_resource_error_mapping() {
        let err = resource_error(ResourceError::not_found("x"));
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    }
}
