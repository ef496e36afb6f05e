//! Resource Registry - central registration of all resources.
//!
//! This module provides dynamic resource registration without modifying service.rs.
//! When adding a new resource:
//! 1. Create the resource file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `get_all_resources()`

use rmcp::model::{AnnotateAble, RawResource};

use super::definitions::{CategoryListResource, ResourceDefinition};
use super::service::ResourceEntry;
use crate::domains::open_data::DataCategory;

/// Helper function to create an annotated resource from a definition.
fn build_resource<R: ResourceDefinition>(definition: R) -> ResourceEntry {
    let mut raw = RawResource::new(definition.uri(), definition.name());
    raw.description = Some(definition.description().to_string());
    raw.mime_type = Some(definition.mime_type().to_string());

    ResourceEntry {
        resource: raw.no_annotation(),
        category: definition.category(),
    }
}

/// Get all registered resources as ResourceEntries.
///
/// This is the central place where all resources are registered.
/// When adding a new resource, add it here.
pub fn get_all_resources() -> Vec<ResourceEntry> {
    DataCategory::ALL
        .into_iter()
        .map(|category| build_resource(CategoryListResource(category)))
        .collect()
}

/// Get the list of all resource URIs.
pub fn resource_uris() -> Vec<&'static str> {
    DataCategory::ALL
        .into_iter()
        .map(|category| CategoryListResource(category).uri())
        .collect()
}
