//! Fetch client for the Sejong open-data endpoints.
//!
//! One call to [`FetchClient::fetch`] is one upstream request: parameters are
//! built from the endpoint registry, the JSON envelope is parsed, and every
//! item is normalized into a [`Record`]. No retries happen here.
//!
//! The network call itself sits behind the [`Upstream`] trait. The default
//! implementation, [`HttpUpstream`], wraps a `reqwest::Client` that accepts
//! the non-standard certificate chain served by `apis.data.go.kr`. That
//! relaxation is configured on this client instance only.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::category::DataCategory;
use super::error::FetchError;
use super::record::Record;
use super::registry::{self, EndpointSpec};

// ============================================================================
// Configuration & Constants
// ============================================================================

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Page size used when walking a complete dataset.
pub const FULL_PAGE_SIZE: u32 = 100;

/// Default upper bound on pages walked by [`FetchClient::fetch_all`].
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Result code the portal uses for a successful call.
const RESULT_CODE_OK: &str = "00";

const USER_AGENT: &str = concat!("openapi-korea-mcp/", env!("CARGO_PKG_VERSION"));

/// Outcome of a fetch.
pub type FetchResult = Result<FetchedPage, FetchError>;

/// Records normalized from one or more upstream pages.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub records: Vec<Record>,
    /// Total reported by the upstream. May exceed `records.len()`.
    pub total_count: usize,
}

// ============================================================================
// Upstream transport
// ============================================================================

/// Raw HTTP answer from an upstream endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Performs the GET request for a fully built URL.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get(&self, url: &str) -> Result<UpstreamResponse, FetchError>;
}

/// `reqwest` backed upstream.
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    /// Build the HTTP client with the given timeout.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            // apis.data.go.kr presents an incomplete chain; scoped to this client.
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| FetchError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get(&self, url: &str) -> Result<UpstreamResponse, FetchError> {
        let started = Instant::now();
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::timeout(started.elapsed())
            } else if e.is_connect() {
                FetchError::transport(format!("Connection failed: {}", e.without_url()))
            } else {
                FetchError::transport(e.without_url().to_string())
            }
        };

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        debug!("Upstream answered {} with {} bytes", status, body.len());

        Ok(UpstreamResponse { status, body })
    }
}

// ============================================================================
// Fetch client
// ============================================================================

/// Category-aware client on top of an [`Upstream`].
#[derive(Clone)]
pub struct FetchClient {
    upstream: Arc<dyn Upstream>,
    service_key: Option<String>,
    max_pages: u32,
}

impl FetchClient {
    /// Create a client. A `None` key makes every fetch fail with
    /// `MissingCredential` without touching the network.
    pub fn new(upstream: Arc<dyn Upstream>, service_key: Option<String>) -> Self {
        Self {
            upstream,
            service_key: service_key.filter(|k| !k.trim().is_empty()),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Bound the number of pages walked by [`fetch_all`](Self::fetch_all).
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn has_credential(&self) -> bool {
        self.service_key.is_some()
    }

    /// Fetch one page of a category.
    pub async fn fetch(
        &self,
        category: DataCategory,
        keyword: &str,
        page_index: u32,
        page_size: u32,
    ) -> FetchResult {
        self.fetch_page(category, keyword, page_index, page_size)
            .await
            .map(ParsedPage::into_fetched)
    }

    #[instrument(skip(self))]
    async fn fetch_page(
        &self,
        category: DataCategory,
        keyword: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<ParsedPage, FetchError> {
        let service_key = self
            .service_key
            .as_deref()
            .ok_or_else(FetchError::missing_credential)?;

        let spec = registry::resolve(category);
        let params = spec.query_params(service_key, keyword, page_index, page_size);
        let url = spec
            .request_url(&params)
            .map_err(|e| FetchError::transport(format!("Failed to encode query: {e}")))?;

        debug!(
            base_url = spec.base_url,
            page_index, page_size, keyword, "Requesting upstream page"
        );

        let response = self.upstream.get(&url).await.inspect_err(|e| {
            warn!("Upstream request for {} failed: {}", category, e);
        })?;

        if !(200..300).contains(&response.status) {
            warn!("Upstream returned HTTP {} for {}", response.status, category);
            return Err(FetchError::upstream(
                format!("HTTP status {}", response.status),
                &response.body,
            ));
        }

        parse_envelope(spec, &response.body)
    }

    /// Fetch the complete dataset of a category by walking pages.
    ///
    /// Stops on a short or empty page, once a total reported by the upstream
    /// is reached, or after `max_pages`. Pages without a reported total only
    /// end the walk by being short. Any failing page fails the whole walk.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, category: DataCategory) -> FetchResult {
        let mut records = Vec::new();
        let mut reported_total: Option<usize> = None;

        for page_index in 1..=self.max_pages {
            let page = self
                .fetch_page(category, "", page_index, FULL_PAGE_SIZE)
                .await?;
            let page_len = page.records.len();
            reported_total = reported_total.max(page.reported_total);
            records.extend(page.records);

            let reached_total = reported_total.is_some_and(|total| records.len() >= total);
            if page_len < FULL_PAGE_SIZE as usize || reached_total {
                break;
            }
            if page_index == self.max_pages {
                warn!(
                    "Stopped after {} pages with {} records (reported total {:?}) for {}",
                    self.max_pages,
                    records.len(),
                    reported_total,
                    category
                );
            }
        }

        debug!("Fetched {} records for {}", records.len(), category);

        Ok(FetchedPage {
            total_count: reported_total.unwrap_or_default().max(records.len()),
            records,
        })
    }
}

// ============================================================================
// Envelope parsing
// ============================================================================

/// One parsed envelope, before the total is settled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedPage {
    pub records: Vec<Record>,
    /// Total as reported by the upstream, if it sent one.
    pub reported_total: Option<usize>,
}

impl ParsedPage {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            reported_total: None,
        }
    }

    /// Settle the total, falling back to the number of items on the page.
    pub fn into_fetched(self) -> FetchedPage {
        FetchedPage {
            total_count: self.reported_total.unwrap_or(self.records.len()),
            records: self.records,
        }
    }
}

/// Parse a portal envelope into normalized records.
///
/// Accepts both `{"response": {"header", "body"}}` and a bare
/// `{"header", "body"}`. Items may be an array, or nested under `item` as an
/// array or a single object.
pub(crate) fn parse_envelope(
    spec: &EndpointSpec,
    raw_body: &str,
) -> Result<ParsedPage, FetchError> {
    let value: Value =
        serde_json::from_str(raw_body).map_err(|e| FetchError::parse(raw_body, e))?;

    let root = value.get("response").unwrap_or(&value);
    if !root.is_object() {
        return Err(FetchError::parse(raw_body, "expected a JSON object envelope"));
    }

    if let Some(code) = root.pointer("/header/resultCode").and_then(scalar_text) {
        if code != RESULT_CODE_OK {
            let message = root
                .pointer("/header/resultMsg")
                .and_then(scalar_text)
                .unwrap_or_else(|| "unknown upstream error".to_string());
            return Err(FetchError::upstream(
                format!("result code {code}: {message}"),
                raw_body,
            ));
        }
    }

    let Some(body) = root.get("body") else {
        return Err(FetchError::parse(raw_body, "envelope has no body"));
    };

    let items = extract_items(body);
    if items.is_empty() {
        return Ok(ParsedPage::empty());
    }

    let records: Vec<Record> = items
        .into_iter()
        .map(|item| Record::from_raw(spec.category, item))
        .collect();

    let reported_total = body.get(spec.total_count_key).and_then(count_value);

    Ok(ParsedPage {
        records,
        reported_total,
    })
}

fn extract_items(body: &Value) -> Vec<&Map<String, Value>> {
    let items = match body.get("items") {
        Some(Value::Object(wrapper)) => wrapper.get("item").unwrap_or(&Value::Null),
        Some(items) => items,
        None => return Vec::new(),
    };

    match items {
        Value::Array(list) => list.iter().filter_map(Value::as_object).collect(),
        Value::Object(single) => vec![single],
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
