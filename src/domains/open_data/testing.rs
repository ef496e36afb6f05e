//! Test doubles for the upstream endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use super::broker::Broker;
use super::cache::CategoryCache;
use super::client::{FetchClient, Upstream, UpstreamResponse};
use super::error::FetchError;

type Handler = Box<dyn Fn(&str) -> Result<UpstreamResponse, FetchError> + Send + Sync>;

/// Upstream answering from a swappable handler and recording every URL.
pub struct ScriptedUpstream {
    handler: Mutex<Handler>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedUpstream {
    pub fn new(
        handler: impl Fn(&str) -> Result<UpstreamResponse, FetchError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Mutex::new(Box::new(handler)),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with the given JSON body.
    pub fn serving(body: Value) -> Arc<Self> {
        let body = body.to_string();
        Self::new(move |_| Ok(UpstreamResponse::ok(body.clone())))
    }

    /// Swap the handler for subsequent calls.
    pub fn replace(
        &self,
        handler: impl Fn(&str) -> Result<UpstreamResponse, FetchError> + Send + Sync + 'static,
    ) {
        *self.handler.lock() = Box::new(handler);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn get(&self, url: &str) -> Result<UpstreamResponse, FetchError> {
        self.calls.lock().push(url.to_string());
        let handler = self.handler.lock();
        (*handler)(url)
    }
}

/// Decode the query string of a request URL.
pub fn query_of(url: &str) -> HashMap<String, String> {
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
    serde_urlencoded::from_str(query).unwrap()
}

/// A portal envelope wrapping `items`.
pub fn envelope(items: Vec<Value>, total_count: usize) -> Value {
    json!({
        "response": {
            "header": {"resultCode": "00", "resultMsg": "NORMAL SERVICE."},
            "body": {
                "items": items,
                "totalCount": total_count,
                "pageIndex": 1
            }
        }
    })
}

pub fn parking_item(name: &str, address: &str) -> Value {
    json!({
        "prkplceNm": name,
        "rdnmadr": address,
        "prkcmprt": 120,
        "feedingSe": "유료",
        "phoneNumber": "044-300-0000",
        "operOpenHm": "00:00",
        "operCloseHm": "23:59"
    })
}

/// Handler serving `items` page by page according to `pageIndex`/`pageUnit`.
pub fn paged_handler(
    items: Vec<Value>,
) -> impl Fn(&str) -> Result<UpstreamResponse, FetchError> + Send + Sync + 'static {
    move |url| {
        let query = query_of(url);
        let page_index: usize = query["pageIndex"].parse().unwrap();
        let page_unit: usize = query["pageUnit"].parse().unwrap();
        let page: Vec<Value> = items
            .iter()
            .skip((page_index - 1) * page_unit)
            .take(page_unit)
            .cloned()
            .collect();
        Ok(UpstreamResponse::ok(envelope(page, items.len()).to_string()))
    }
}

/// Broker over a scripted upstream with a configured key.
pub fn broker_with(upstream: Arc<ScriptedUpstream>) -> Broker {
    let client = FetchClient::new(upstream, Some("test-key".to_string()));
    Broker::new(client, Arc::new(CategoryCache::new()))
}
