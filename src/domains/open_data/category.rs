//! Data categories served by the broker.
//!
//! A category selects the upstream endpoint, the record schema and the
//! fields the filter engine searches. The set is fixed.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::UnknownCategory;

/// Prefix shared by every category resource URI.
const RESOURCE_SCHEME: &str = "sejong://";

/// One of the four Sejong City open-data domains.
///
/// Deserializes through [`FromStr`], so arguments accept the same spellings
/// everywhere (any case, `-` or `_`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    /// Public and private parking lots.
    Parking,
    /// Designated smoking areas.
    SmokingArea,
    /// Certified restaurants.
    Restaurant,
    /// CCTV installations.
    Cctv,
}

impl DataCategory {
    /// Every category, in slot order.
    pub const ALL: [DataCategory; 4] = [
        DataCategory::Parking,
        DataCategory::SmokingArea,
        DataCategory::Restaurant,
        DataCategory::Cctv,
    ];

    /// Stable identifier used in URIs, tool names and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parking => "parking",
            Self::SmokingArea => "smoking_area",
            Self::Restaurant => "restaurant",
            Self::Cctv => "cctv",
        }
    }

    /// Position of this category's cache slot.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Parking => 0,
            Self::SmokingArea => 1,
            Self::Restaurant => 2,
            Self::Cctv => 3,
        }
    }

    /// Human readable name shown to MCP clients.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Parking => "세종시 주차장 목록",
            Self::SmokingArea => "세종시 흡연구역 목록",
            Self::Restaurant => "세종시 음식점 목록",
            Self::Cctv => "세종시 CCTV 목록",
        }
    }

    /// URI of the resource exposing the full cached dataset.
    pub fn resource_uri(self) -> &'static str {
        match self {
            Self::Parking => "sejong://parking/list",
            Self::SmokingArea => "sejong://smoking_area/list",
            Self::Restaurant => "sejong://restaurant/list",
            Self::Cctv => "sejong://cctv/list",
        }
    }

    /// Name of the search tool for this category.
    pub fn tool_name(self) -> &'static str {
        match self {
            Self::Parking => "sejong_parking_search",
            Self::SmokingArea => "sejong_smoking_area_search",
            Self::Restaurant => "sejong_restaurant_search",
            Self::Cctv => "sejong_cctv_search",
        }
    }

    /// Resolve a `sejong://<category>/list` URI.
    pub fn from_resource_uri(uri: &str) -> Result<Self, UnknownCategory> {
        uri.strip_prefix(RESOURCE_SCHEME)
            .and_then(|rest| rest.strip_suffix("/list"))
            .ok_or_else(|| UnknownCategory(uri.to_string()))?
            .parse()
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DataCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for DataCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "parking" => Ok(Self::Parking),
            "smoking_area" => Ok(Self::SmokingArea),
            "restaurant" => Ok(Self::Restaurant),
            "cctv" => Ok(Self::Cctv),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}
