//! Sauna Directory - location hierarchy and confidence ranking for a sauna
//! business directory.
//!
//! Records come from a [`services::BusinessSource`]; the core module groups
//! them into a province → city hierarchy, filters them by location and ranks
//! them by the lower bound of the Wilson score interval.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    build_hierarchy, filter_by_location, rank_by_confidence_score, slugify, title_case, wilson_score, Directory,
    LocationFilter,
};
pub use models::{Business, CityNode, ProvinceHierarchy, ProvinceNode};
