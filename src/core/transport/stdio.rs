//! STDIO transport implementation.
//!
//! Standard input/output transport for MCP, the default mode. Logs go to
//! stderr so stdout carries protocol messages only.

use rmcp::ServiceExt;
use tracing::{info, warn};

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until the client disconnects.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!(
            "{} ready on stdin/stdout ({} tools)",
            server.name(),
            server.list_tools().len()
        );
        if server.config().credentials.service_key().is_none() {
            warn!("Serving without a service key; data requests will report missing_credential");
        }

        let service = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        let reason = service
            .waiting()
            .await
            .map_err(|e| TransportError::service(e.to_string()))?;

        info!("STDIO transport finished: {:?}", reason);
        Ok(())
    }
}
