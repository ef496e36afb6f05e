//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod cache;
pub mod common;
pub mod refresh;
pub mod search;

pub use cache::{ShowCachedDataParams, ShowCachedDataTool};
pub use refresh::{RefreshDataParams, RefreshDataTool};
pub use search::{CategorySearchParams, CategorySearchTool, SearchDataParams, SearchDataTool};
