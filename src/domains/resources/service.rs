//! Resource service implementation.
//!
//! The ResourceService lists the registered resources and reads them through
//! the open-data broker. A fetch failure is returned as resource content
//! holding the error envelope, so clients can inspect the raw payload.
//!
//! Resources are defined in `definitions/` and registered via `registry.rs`.
//! Adding a new resource does NOT require modifying this file.

use rmcp::model::{ReadResourceResult, Resource, ResourceContents};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ResourceError;
use super::registry::get_all_resources;
use crate::domains::open_data::{Broker, DataCategory};

/// Service for managing and accessing resources.
pub struct ResourceService {
    /// Broker answering reads.
    broker: Arc<Broker>,

    /// Registered resources, in listing order.
    resources: Vec<ResourceEntry>,
}

/// An entry in the resource registry.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// The resource metadata.
    pub resource: Resource,

    /// The dataset served under this resource.
    pub category: DataCategory,
}

impl ResourceService {
    /// Create a new ResourceService reading through `broker`.
    pub fn new(broker: Arc<Broker>) -> Self {
        info!("Initializing ResourceService");

        let mut service = Self {
            broker,
            resources: Vec::new(),
        };

        // Register all resources from registry
        for entry in get_all_resources() {
            service.register_resource(entry);
        }

        service
    }

    /// Register a resource.
    pub fn register_resource(&mut self, entry: ResourceEntry) {
        info!("Registering resource: {}", entry.resource.raw.uri);
        self.resources.push(entry);
    }

    /// List all available resources.
    pub async fn list_resources(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .map(|entry| entry.resource.clone())
            .collect()
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let category = match self
            .resources
            .iter()
            .find(|entry| entry.resource.raw.uri == uri)
        {
            Some(entry) => entry.category,
            None => DataCategory::from_resource_uri(uri)?,
        };

        let text = match self.broker.read_resource(category).await {
            Ok(envelope) => serde_json::to_string_pretty(&envelope)?,
            Err(error) => {
                warn!("Resource {} could not be loaded: {}", uri, error);
                serde_json::to_string_pretty(&error)?
            }
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::open_data::testing::{ScriptedUpstream, broker_with, envelope, parking_item};
    use crate::domains::open_data::UpstreamResponse;

    fn service(upstream: Arc<ScriptedUpstream>) -> ResourceService {
        ResourceService::new(Arc::new(broker_with(upstream)))
    }

    fn text_of(result: &ReadResourceResult) -> serde_json::Value {
        match &result.contents[0] {
            ResourceContents::TextResourceContents { text, .. } => {
                serde_json::from_str(text).unwrap()
            }
            other => panic!("expected text contents, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lists_one_resource_per_category() {
        let service = service(ScriptedUpstream::serving(envelope(vec![], 0)));
        let resources = service.list_resources().await;
        assert_eq!(resources.len(), 4);
        assert_eq!(resources[0].raw.uri, "sejong://parking/list");
    }

    #[tokio::test]
    async fn test_read_populates_then_serves_cache() {
        let upstream =
            ScriptedUpstream::serving(envelope(vec![parking_item("세종시청 주차장", "세종")], 1));
        let service = service(upstream.clone());

        let first = text_of(&service.read_resource("sejong://parking/list").await.unwrap());
        assert_eq!(first["source"], "live");
        assert_eq!(first["records"][0]["name"], "세종시청 주차장");

        let second = text_of(&service.read_resource("sejong://parking/list").await.unwrap());
        assert_eq!(second["source"], "cache");
        assert_eq!(upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_returns_error_envelope() {
        let upstream = ScriptedUpstream::new(|_| Ok(UpstreamResponse::ok("SERVICE ERROR")));
        let service = service(upstream);

        let value = text_of(&service.read_resource("sejong://cctv/list").await.unwrap());
        assert_eq!(value["error_kind"], "parse_error");
        assert_eq!(value["raw_payload"], "SERVICE ERROR");
    }

    #[tokio::test]
    async fn test_read_nonexistent_resource() {
        let service = service(ScriptedUpstream::serving(envelope(vec![], 0)));
        let result = service.read_resource("sejong://weather/list").await;
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
    }
}
