// Core algorithm exports
pub mod directory;
pub mod filters;
pub mod hierarchy;
pub mod normalize;
pub mod ranking;

pub use directory::{Directory, ListingResult};
pub use filters::{filter_by_location, matches_location, LocationFilter};
pub use hierarchy::{
    build_country_index, build_hierarchy, find_city_by_slug, find_province_by_slug, resolve_location,
    LocationMatch,
};
pub use normalize::{location_key, slug_matches, slugify, title_case};
pub use ranking::{confidence_score, rank_by_confidence_score, select_featured, wilson_score};
