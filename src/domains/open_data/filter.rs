//! Keyword filter and pagination over normalized records.
//!
//! The portal's own `searchKeyword` is unreliable for address queries, so
//! keyword search is done locally over the complete cached dataset.

use super::record::Record;

/// Records whose searchable fields contain `keyword`, in original order.
///
/// Matching is a case-insensitive substring test against any of
/// `searchable_fields`. An empty or blank keyword matches every record.
pub fn filter(records: &[Record], keyword: &str, searchable_fields: &[&str]) -> Vec<Record> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| matches(record, &needle, searchable_fields))
        .cloned()
        .collect()
}

/// Whether any searchable field of `record` contains the already case-folded
/// `needle`. Missing fields never match.
pub fn matches(record: &Record, needle: &str, searchable_fields: &[&str]) -> bool {
    searchable_fields.iter().any(|name| {
        record
            .field(name)
            .and_then(|value| value.search_text())
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

/// One page of `items`. Pages are 1-based; out-of-range pages are empty.
pub fn paginate<T: Clone>(items: &[T], page_index: u32, page_size: u32) -> Vec<T> {
    let page_index = page_index.max(1) as usize;
    let page_size = page_size.max(1) as usize;
    let start = (page_index - 1).saturating_mul(page_size);
    items.iter().skip(start).take(page_size).cloned().collect()
}
