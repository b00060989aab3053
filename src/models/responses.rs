use serde::{Deserialize, Serialize};
use crate::models::domain::Business;
use crate::services::CacheStats;

/// Response for the ranked listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingResponse {
    pub businesses: Vec<Business>,
    pub total_results: usize,
}

/// A city as listed on a province page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CitySummary {
    pub key: String,
    pub name: String,
    pub slug: String,
    pub count: usize,
}

/// A province as listed on a country page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvinceSummary {
    pub key: String,
    pub name: String,
    pub slug: String,
    pub count: usize,
    pub city_count: usize,
}

/// Everything a province page shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvincePage {
    pub key: String,
    pub name: String,
    pub slug: String,
    pub count: usize,
    /// Sorted by display name
    pub cities: Vec<CitySummary>,
    /// Ranked best-first
    pub businesses: Vec<Business>,
}

/// Everything a city page shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityPage {
    pub province: LocationRef,
    pub city: CitySummary,
    /// Ranked best-first
    pub businesses: Vec<Business>,
}

/// Everything a country page shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryPage {
    pub key: String,
    pub name: String,
    pub slug: String,
    pub count: usize,
    /// Sorted by display name
    pub provinces: Vec<ProvinceSummary>,
    /// Top ranked businesses across the country
    pub businesses: Vec<Business>,
}

/// Breadcrumb link to a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRef {
    pub key: String,
    pub name: String,
    pub slug: String,
}

/// A single-segment location URL resolves to a country or a province
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LocationPage {
    Country(CountryPage),
    Province(ProvincePage),
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cache: CacheStats,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
