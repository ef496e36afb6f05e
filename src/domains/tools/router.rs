//! Tool Router - builds the rmcp ToolRouter.
//!
//! This module builds the ToolRouter for the STDIO transport by delegating
//! to the tool definitions themselves. Each tool knows how to create its own route.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{CategorySearchTool, RefreshDataTool, SearchDataTool, ShowCachedDataTool};
use crate::domains::open_data::{Broker, DataCategory};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(broker: Arc<Broker>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let router = DataCategory::ALL
        .into_iter()
        .fold(ToolRouter::new(), |router, category| {
            router.with_route(CategorySearchTool::create_route(category, broker.clone()))
        });

    router
        .with_route(SearchDataTool::create_route(broker.clone()))
        .with_route(ShowCachedDataTool::create_route(broker.clone()))
        .with_route(RefreshDataTool::create_route(broker))
}
