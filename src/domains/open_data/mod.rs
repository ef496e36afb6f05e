//! Sejong City open-data domain.
//!
//! Fetches the four public datasets from `apis.data.go.kr`, normalizes them
//! into typed records, keeps one cached snapshot per category and answers
//! filtered, paginated queries over those snapshots.

pub mod broker;
pub mod cache;
pub mod category;
pub mod client;
pub mod error;
pub mod filter;
pub mod record;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use broker::{
    Broker, BrokerResult, DEFAULT_PAGE_SIZE, ErrorEnvelope, MAX_PAGE_SIZE, QueryError,
    ResultEnvelope, SearchQuery, Source,
};
pub use cache::{CacheEntry, CategoryCache};
pub use category::DataCategory;
pub use client::{FetchClient, FetchResult, FetchedPage, HttpUpstream, Upstream, UpstreamResponse};
pub use error::{ErrorKind, FetchError, UnknownCategory};
pub use record::{FieldValue, Record};
