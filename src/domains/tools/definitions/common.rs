//! Helpers shared by the open-data tools.
//!
//! Results carry the envelope as structured content. The text content holds
//! a one-line summary followed by the same envelope as pretty JSON, for
//! clients that ignore structured content.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domains::open_data::{BrokerResult, DataCategory, ErrorEnvelope, ResultEnvelope};

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Create a result with a summary and structured content.
pub fn structured_result<T: Serialize>(summary: String, data: T) -> CallToolResult {
    build_result(summary, data, false)
}

/// Like [`structured_result`] but flagged as an error.
pub fn structured_error<T: Serialize>(summary: String, data: T) -> CallToolResult {
    build_result(summary, data, true)
}

fn build_result<T: Serialize>(summary: String, data: T, is_error: bool) -> CallToolResult {
    match serde_json::to_value(&data) {
        Ok(structured) => {
            let pretty = serde_json::to_string_pretty(&structured).unwrap_or_default();
            CallToolResult {
                content: vec![Content::text(summary), Content::text(pretty)],
                structured_content: Some(structured),
                is_error: Some(is_error),
                meta: None,
            }
        }
        Err(e) => error_result(&format!("Failed to serialize structured content: {e}")),
    }
}

/// Turn a broker answer into a tool result.
pub fn envelope_result(result: BrokerResult<ResultEnvelope>) -> CallToolResult {
    match result {
        Ok(envelope) => structured_result(envelope.summary(), envelope),
        Err(error) => fetch_error_result(error),
    }
}

/// Tool result for a failed fetch. Never a protocol-level error.
pub fn fetch_error_result(error: ErrorEnvelope) -> CallToolResult {
    warn!("Returning fetch failure to client: {}", error);
    structured_error(format!("Fetch failed for {}", error), error)
}

/// Map invalid arguments to an MCP `invalid_params` error.
pub fn invalid_params(e: impl std::fmt::Display) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

/// Decode tool arguments into a parameter struct.
pub fn parse_params<P: for<'de> Deserialize<'de>>(
    arguments: serde_json::Value,
) -> Result<P, McpError> {
    serde_json::from_value(arguments).map_err(invalid_params)
}

/// Categories selected by an optional `category` argument.
///
/// Absent or `"all"` selects every category.
pub fn category_scope(category: Option<&str>) -> Result<Vec<DataCategory>, McpError> {
    match category.map(str::trim) {
        None | Some("") => Ok(DataCategory::ALL.to_vec()),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(DataCategory::ALL.to_vec()),
        Some(value) => value
            .parse::<DataCategory>()
            .map(|c| vec![c])
            .map_err(invalid_params),
    }
}

/// JSON shape of a tool result on the HTTP transport.
#[cfg(feature = "http")]
pub fn to_http_value(result: CallToolResult) -> serde_json::Value {
    let mut response = serde_json::json!({
        "content": result.content,
        "isError": result.is_error.unwrap_or(false)
    });

    if let (Some(structured), Some(object)) = (result.structured_content, response.as_object_mut())
    {
        object.insert("structuredContent".to_string(), structured);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::open_data::{ErrorKind, Source};

    #[test]
    fn test_category_scope() {
        assert_eq!(category_scope(None).unwrap().len(), 4);
        assert_eq!(category_scope(Some("ALL")).unwrap().len(), 4);
        assert_eq!(
            category_scope(Some("smoking-area")).unwrap(),
            vec![DataCategory::SmokingArea]
        );
        assert!(category_scope(Some("weather")).is_err());
    }

    #[test]
    fn test_envelope_result_success() {
        let envelope = ResultEnvelope {
            category: DataCategory::Parking,
            records: vec![],
            total_count: 0,
            returned_count: 0,
            source: Source::Live,
        };
        let result = envelope_result(Ok(envelope));
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.content.len(), 2);
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["source"], "live");
    }

    #[test]
    fn test_envelope_result_failure_is_tool_error() {
        let error = ErrorEnvelope {
            category: DataCategory::Cctv,
            error_kind: ErrorKind::ParseError,
            detail: "not json".to_string(),
            raw_payload: Some("<html>".to_string()),
        };
        let result = envelope_result(Err(error));
        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["error_kind"], "parse_error");
        assert_eq!(structured["raw_payload"], "<html>");
    }
}
