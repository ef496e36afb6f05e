//! Dispatch layer: the single entry point resources and tools go through.
//!
//! Resource reads serve the cached snapshot when one exists and fetch the
//! complete dataset otherwise. Keyword queries always filter the complete
//! dataset locally, preferring the cache over any network call. The first
//! page of a query without a keyword goes to the upstream and refreshes the
//! cache; later pages reuse that snapshot while it is fresh.
//!
//! A failed fetch never touches the cache.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::cache::{CacheEntry, CategoryCache};
use super::category::DataCategory;
use super::client::{FetchClient, HttpUpstream};
use super::error::{ErrorKind, FetchError};
use super::filter::{filter, paginate};
use super::record::Record;
use super::registry;
use crate::core::config::Config;

/// Default number of records per page for tool queries.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a tool query may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Where the records of an envelope came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Live,
}

/// Successful answer to a resource read or tool query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub category: DataCategory,
    pub records: Vec<Record>,
    pub total_count: usize,
    pub returned_count: usize,
    pub source: Source,
}

impl ResultEnvelope {
    fn new(category: DataCategory, records: Vec<Record>, total_count: usize, source: Source) -> Self {
        Self {
            category,
            returned_count: records.len(),
            records,
            total_count,
            source,
        }
    }

    /// One-line human summary used as the text content of tool results.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} of {} records ({})",
            self.category.display_name(),
            self.returned_count,
            self.total_count,
            match self.source {
                Source::Cache => "cache",
                Source::Live => "live",
            }
        )
    }
}

/// Failed answer, shaped like a result so agents can inspect it.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{category}: {error_kind}: {detail}")]
pub struct ErrorEnvelope {
    pub category: DataCategory,
    pub error_kind: ErrorKind,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<String>,
}

impl ErrorEnvelope {
    pub fn from_fetch(category: DataCategory, error: FetchError) -> Self {
        Self {
            category,
            error_kind: error.kind,
            detail: error.detail,
            raw_payload: error.raw_payload,
        }
    }
}

pub type BrokerResult<T> = Result<T, ErrorEnvelope>;

/// Rejected query arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("page_index must be at least 1, got {0}")]
    PageIndex(u32),

    #[error("page_size must be between 1 and {max}, got {0}", max = MAX_PAGE_SIZE)]
    PageSize(u32),
}

/// A validated tool query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub category: DataCategory,
    pub keyword: Option<String>,
    pub page_index: u32,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn new(
        category: DataCategory,
        keyword: Option<String>,
        page_index: u32,
        page_size: u32,
    ) -> Result<Self, QueryError> {
        if page_index < 1 {
            return Err(QueryError::PageIndex(page_index));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(QueryError::PageSize(page_size));
        }
        Ok(Self {
            category,
            keyword,
            page_index,
            page_size,
        })
    }

    /// The trimmed keyword, empty when none was given.
    pub fn keyword(&self) -> &str {
        self.keyword.as_deref().map(str::trim).unwrap_or_default()
    }
}

/// Owns the fetch client and a handle to the category cache.
#[derive(Clone)]
pub struct Broker {
    client: FetchClient,
    cache: Arc<CategoryCache>,
    cache_ttl: Option<Duration>,
}

impl Broker {
    pub fn new(client: FetchClient, cache: Arc<CategoryCache>) -> Self {
        Self {
            client,
            cache,
            cache_ttl: None,
        }
    }

    /// Serve cache entries only while younger than `ttl`.
    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Build a broker over the real HTTP upstream with an empty cache.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let upstream = HttpUpstream::new(config.fetch.timeout())?;
        let client = FetchClient::new(
            Arc::new(upstream),
            config.credentials.service_key().map(str::to_string),
        )
        .with_max_pages(config.fetch.max_pages);

        if !client.has_credential() {
            warn!("No service key configured; every fetch will fail with missing_credential");
        }

        Ok(Self::new(client, Arc::new(CategoryCache::new())).with_cache_ttl(config.cache.ttl()))
    }

    pub fn cache(&self) -> &Arc<CategoryCache> {
        &self.cache
    }

    /// Full snapshot of a category, fetching it first if nothing is cached.
    #[instrument(skip(self))]
    pub async fn read_resource(&self, category: DataCategory) -> BrokerResult<ResultEnvelope> {
        let (entry, source) = match self.fresh_entry(category) {
            Some(entry) => (entry, Source::Cache),
            None => (self.load(category, None).await?, Source::Live),
        };

        info!(
            "Resource {} served {} records from {:?}",
            category,
            entry.records.len(),
            source
        );

        Ok(ResultEnvelope::new(
            category,
            entry.records.clone(),
            entry.total_count,
            source,
        ))
    }

    /// Answer a tool query.
    #[instrument(skip(self, query), fields(category = %query.category, keyword = query.keyword()))]
    pub async fn query(&self, query: &SearchQuery) -> BrokerResult<ResultEnvelope> {
        let category = query.category;
        let keyword = query.keyword();

        if keyword.is_empty() {
            let (entry, source) = match self.fresh_entry(category) {
                Some(entry) if query.page_index > 1 => (entry, Source::Cache),
                _ => (self.load(category, None).await?, Source::Live),
            };
            let page = paginate(&entry.records, query.page_index, query.page_size);
            info!(
                "Query {} returned {} records ({:?})",
                category,
                page.len(),
                source
            );
            return Ok(ResultEnvelope::new(
                category,
                page,
                entry.total_count,
                source,
            ));
        }

        let (entry, source) = match self.fresh_entry(category) {
            Some(entry) => (entry, Source::Cache),
            None => (
                self.load(category, Some(keyword.to_string())).await?,
                Source::Live,
            ),
        };

        let spec = registry::resolve(category);
        let matched = filter(&entry.records, keyword, spec.searchable_fields);
        let page = paginate(&matched, query.page_index, query.page_size);

        info!(
            "Query {} matched {}/{} records, returned {} ({:?})",
            category,
            matched.len(),
            entry.records.len(),
            page.len(),
            source
        );

        Ok(ResultEnvelope::new(category, page, matched.len(), source))
    }

    /// Current cache entry, never fetches.
    pub fn cached(&self, category: DataCategory) -> Option<Arc<CacheEntry>> {
        self.cache.get(category)
    }

    /// Fetch the complete dataset again and replace the cache entry.
    #[instrument(skip(self))]
    pub async fn refresh(&self, category: DataCategory) -> BrokerResult<Arc<CacheEntry>> {
        self.load(category, None).await
    }

    /// Refresh several categories concurrently, in the given order.
    pub async fn refresh_many(
        &self,
        categories: &[DataCategory],
    ) -> Vec<(DataCategory, BrokerResult<Arc<CacheEntry>>)> {
        let results = join_all(categories.iter().map(|&c| self.refresh(c))).await;
        categories.iter().copied().zip(results).collect()
    }

    /// Refresh every category concurrently.
    pub async fn refresh_all(&self) -> Vec<(DataCategory, BrokerResult<Arc<CacheEntry>>)> {
        self.refresh_many(&DataCategory::ALL).await
    }

    fn fresh_entry(&self, category: DataCategory) -> Option<Arc<CacheEntry>> {
        self.cache
            .get(category)
            .filter(|entry| entry.is_fresh(self.cache_ttl))
    }

    async fn load(
        &self,
        category: DataCategory,
        query_used: Option<String>,
    ) -> BrokerResult<Arc<CacheEntry>> {
        let page = self.client.fetch_all(category).await.map_err(|e| {
            warn!("Fetch for {} failed, cache left as is: {}", category, e);
            ErrorEnvelope::from_fetch(category, e)
        })?;

        Ok(self
            .cache
            .put(category, page.records, page.total_count, query_used))
    }
}
