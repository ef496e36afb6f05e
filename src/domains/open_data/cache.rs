//! Category cache: one slot per data category.
//!
//! Each slot holds the latest successful snapshot as an `Arc<CacheEntry>`.
//! Readers clone the `Arc` under a short read lock, so a concurrent `put`
//! replaces the slot without ever exposing a half-written entry. Slots are
//! independent; there is no cross-category locking.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use super::category::DataCategory;
use super::record::Record;

/// Snapshot of the most recent successful fetch for a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub category: DataCategory,
    pub records: Vec<Record>,
    pub total_count: usize,
    pub fetched_at: DateTime<Utc>,
    /// Keyword of the request that produced this snapshot, if any.
    pub query_used: Option<String>,
}

impl CacheEntry {
    /// Seconds since the snapshot was taken.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.fetched_at).num_seconds().max(0)
    }

    /// Whether the entry may still be served. Without a TTL it always may.
    pub fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            None => true,
            Some(ttl) => (Utc::now() - self.fetched_at)
                .to_std()
                .map(|age| age < ttl)
                .unwrap_or(true),
        }
    }
}

/// Per-category single-slot cache.
#[derive(Debug, Default)]
pub struct CategoryCache {
    slots: [RwLock<Option<Arc<CacheEntry>>>; 4],
}

impl CategoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry for `category`. Never fetches.
    pub fn get(&self, category: DataCategory) -> Option<Arc<CacheEntry>> {
        self.slots[category.index()].read().clone()
    }

    /// Replace the entry for `category` (last write wins).
    pub fn put(
        &self,
        category: DataCategory,
        records: Vec<Record>,
        total_count: usize,
        query_used: Option<String>,
    ) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry {
            category,
            records,
            total_count,
            fetched_at: Utc::now(),
            query_used,
        });

        debug!(
            "Caching {} records for {} (reported total {})",
            entry.records.len(),
            category,
            total_count
        );

        *self.slots[category.index()].write() = Some(entry.clone());
        entry
    }

    /// Current entries of every category, in slot order.
    pub fn snapshot(&self) -> Vec<(DataCategory, Option<Arc<CacheEntry>>)> {
        DataCategory::ALL
            .iter()
            .map(|&category| (category, self.get(category)))
            .collect()
    }
}
