use crate::core::normalize::location_key;
use crate::models::Business;

/// Location scope of a query, as written by the caller
///
/// Values may arrive as display names, slugs or underscore-joined names;
/// they are normalized once on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    province: Option<String>,
    city: Option<String>,
}

impl LocationFilter {
    pub fn new(province: Option<&str>, city: Option<&str>) -> Self {
        Self {
            province: province.map(location_key).filter(|key| !key.is_empty()),
            city: city.map(location_key).filter(|key| !key.is_empty()),
        }
    }

    pub fn province(province: &str) -> Self {
        Self::new(Some(province), None)
    }

    pub fn city(province: &str, city: &str) -> Self {
        Self::new(Some(province), Some(city))
    }

    /// Normalized province key, if the filter has one
    pub fn province_key(&self) -> Option<&str> {
        self.province.as_deref()
    }

    pub fn city_key(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn is_unscoped(&self) -> bool {
        self.province.is_none() && self.city.is_none()
    }
}

/// Check if a business lies within the filter's province and city
#[inline]
pub fn matches_location(business: &Business, filter: &LocationFilter) -> bool {
    if let Some(province) = filter.province_key() {
        if location_key(&business.province) != province {
            return false;
        }
    }

    if let Some(city) = filter.city_key() {
        if location_key(&business.city) != city {
            return false;
        }
    }

    true
}

/// Keep the businesses that match the filter, in input order
pub fn filter_by_location(businesses: Vec<Business>, filter: &LocationFilter) -> Vec<Business> {
    if filter.is_unscoped() {
        return businesses;
    }

    businesses
        .into_iter()
        .filter(|business| matches_location(business, filter))
        .collect()
}
