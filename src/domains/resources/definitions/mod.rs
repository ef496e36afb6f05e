//! Resource definitions module.
//!
//! Each resource is defined in its own file with its URI and metadata.
//! Content is produced by the open-data broker at read time.
//!
//! ## Adding a New Resource
//!
//! 1. Create a new file (e.g., `my_resource.rs`)
//! 2. Implement the `ResourceDefinition` trait
//! 3. Export it here
//! 4. Register in `registry.rs`

mod category_list;

pub use category_list::CategoryListResource;

use crate::domains::open_data::DataCategory;

/// Trait for resource definitions.
///
/// Each resource must implement this trait to provide its metadata.
pub trait ResourceDefinition {
    /// The unique URI of the resource.
    fn uri(&self) -> &'static str;

    /// The display name of the resource.
    fn name(&self) -> &'static str;

    /// A description of the resource.
    fn description(&self) -> &'static str;

    /// The MIME type of the resource content.
    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    /// The dataset backing this resource.
    fn category(&self) -> DataCategory;
}
