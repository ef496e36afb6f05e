//! Full-dataset resource, one per category.

use super::ResourceDefinition;
use crate::domains::open_data::DataCategory;

/// The complete cached dataset of one category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryListResource(pub DataCategory);

impl ResourceDefinition for CategoryListResource {
    fn uri(&self) -> &'static str {
        self.0.resource_uri()
    }

    fn name(&self) -> &'static str {
        self.0.display_name()
    }

    fn description(&self) -> &'static str {
        match self.0 {
            DataCategory::Parking => {
                "All Sejong City parking lots with address, capacity, fees and opening hours"
            }
            DataCategory::SmokingArea => "All designated smoking areas in Sejong City",
            DataCategory::Restaurant => "All certified restaurants in Sejong City with main menu",
            DataCategory::Cctv => "All CCTV installations in Sejong City with purpose and agency",
        }
    }

    fn category(&self) -> DataCategory {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_follows_category() {
        let resource = CategoryListResource(DataCategory::SmokingArea);
        assert_eq!(resource.uri(), "sejong://smoking_area/list");
        assert_eq!(resource.mime_type(), "application/json");
        assert_eq!(resource.category(), DataCategory::SmokingArea);
    }
}
