// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    clamp_rating, truncate, Business, CategoryFlags, CityNode, CountryIndex, CountryNode, GeoPoint,
    PriceRange, ProvinceHierarchy, ProvinceNode, SaunaType, TriState, DEFAULT_COUNTRY, MAX_RATING,
};
pub use requests::SaunaQuery;
pub use responses::{
    CityPage, CitySummary, CountryPage, ErrorResponse, HealthResponse, ListingResponse, LocationPage,
    LocationRef, ProvincePage, ProvinceSummary,
};
