use crate::core::{
    filters::{filter_by_location, LocationFilter},
    hierarchy::{
        build_country_index, build_hierarchy, find_city_by_slug, find_province_by_slug,
        resolve_location, LocationMatch,
    },
    normalize::location_key,
    ranking::rank_by_confidence_score,
};
use crate::models::{
    Business, CityPage, CitySummary, CountryNode, CountryPage, LocationPage, LocationRef,
    ProvinceNode, ProvincePage, ProvinceSummary,
};

/// Result of a ranked listing
#[derive(Debug)]
pub struct ListingResult {
    pub businesses: Vec<Business>,
    /// Matches before the limit was applied
    pub total_matches: usize,
}

/// Browse orchestrator: turns one snapshot of records into the views the
/// directory pages need
///
/// # Pipeline
/// 1. Location filter (province/city, separator-insensitive)
/// 2. Wilson-score ranking
/// 3. Limit
///
/// Every method is pure over the records it is given.
#[derive(Debug, Clone)]
pub struct Directory {
    default_limit: usize,
    max_limit: usize,
}

impl Directory {
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    pub fn with_default_limits() -> Self {
        Self::new(50, 200)
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    /// Requested page size, bounded to `1..=max_limit`
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).clamp(1, self.max_limit)
    }

    /// Ranked businesses within a location scope
    pub fn listing(
        &self,
        records: Vec<Business>,
        filter: &LocationFilter,
        limit: Option<usize>,
    ) -> ListingResult {
        let limit = self.effective_limit(limit);

        let matching = filter_by_location(records, filter);
        let total_matches = matching.len();

        let mut businesses = rank_by_confidence_score(matching);
        businesses.truncate(limit);

        ListingResult {
            businesses,
            total_matches,
        }
    }

    /// Province page for a province slug, `None` if no province matches
    pub fn province_page(&self, records: Vec<Business>, province_slug: &str) -> Option<ProvincePage> {
        let hierarchy = build_hierarchy(&records);
        let (key, node) = find_province_by_slug(&hierarchy, province_slug)?;
        Some(self.assemble_province_page(records, None, key, node))
    }

    /// City page for a province slug and a city slug
    pub fn city_page(
        &self,
        records: Vec<Business>,
        province_slug: &str,
        city_slug: &str,
    ) -> Option<CityPage> {
        let hierarchy = build_hierarchy(&records);
        let (province_key, province) = find_province_by_slug(&hierarchy, province_slug)?;
        let city = find_city_by_slug(province, city_slug)?;

        let filter = LocationFilter::city(province_key, &city.key);
        let businesses = rank_by_confidence_score(filter_by_location(records, &filter));

        Some(CityPage {
            province: LocationRef {
                key: province_key.to_string(),
                name: province.name.clone(),
                slug: province.slug.clone(),
            },
            city: CitySummary {
                key: city.key.clone(),
                name: city.name.clone(),
                slug: crate::core::normalize::slugify(&city.key),
                count: city.count,
            },
            businesses,
        })
    }

    /// Country page for a country slug
    pub fn country_page(&self, records: Vec<Business>, country_slug: &str) -> Option<CountryPage> {
        let countries = build_country_index(&records);
        match resolve_location(&countries, country_slug)? {
            LocationMatch::Country { key, node } => {
                Some(self.assemble_country_page(records, key, node))
            }
            LocationMatch::Province { .. } => None,
        }
    }

    /// Resolve a single-segment location URL to a country or province page
    pub fn location_page(&self, records: Vec<Business>, slug: &str) -> Option<LocationPage> {
        let countries = build_country_index(&records);

        let page = match resolve_location(&countries, slug)? {
            LocationMatch::Country { key, node } => {
                LocationPage::Country(self.assemble_country_page(records, key, node))
            }
            LocationMatch::Province { country, key, node } => {
                LocationPage::Province(self.assemble_province_page(records, Some(country), key, node))
            }
        };

        Some(page)
    }

    /// `country` scopes the businesses to the country the node was built from;
    /// `None` when the node spans every country
    fn assemble_province_page(
        &self,
        records: Vec<Business>,
        country: Option<&str>,
        key: &str,
        node: &ProvinceNode,
    ) -> ProvincePage {
        let mut cities: Vec<CitySummary> = node
            .cities
            .iter()
            .map(|(slug, city)| CitySummary {
                key: city.key.clone(),
                name: city.name.clone(),
                slug: slug.clone(),
                count: city.count,
            })
            .collect();
        cities.sort_by(|a, b| a.name.cmp(&b.name));

        let country_key = country.map(location_key);

        // Records without a city are not part of the province node
        let businesses: Vec<Business> = filter_by_location(records, &LocationFilter::province(key))
            .into_iter()
            .filter(Business::has_location)
            .filter(|b| country_key.as_ref().map_or(true, |c| country_of(b) == *c))
            .collect();

        ProvincePage {
            key: key.to_string(),
            name: node.name.clone(),
            slug: node.slug.clone(),
            count: node.count,
            cities,
            businesses: rank_by_confidence_score(businesses),
        }
    }

    fn assemble_country_page(
        &self,
        records: Vec<Business>,
        key: &str,
        node: &CountryNode,
    ) -> CountryPage {
        let mut provinces: Vec<ProvinceSummary> = node
            .provinces
            .iter()
            .map(|(province_key, province)| ProvinceSummary {
                key: province_key.clone(),
                name: province.name.clone(),
                slug: province.slug.clone(),
                count: province.count,
                city_count: province.cities.len(),
            })
            .collect();
        provinces.sort_by(|a, b| a.name.cmp(&b.name));

        let country_key = location_key(key);
        let in_country: Vec<Business> = records
            .into_iter()
            .filter(|b| b.has_location() && country_of(b) == country_key)
            .collect();

        let mut businesses = rank_by_confidence_score(in_country);
        businesses.truncate(self.default_limit);

        CountryPage {
            key: key.to_string(),
            name: node.name.clone(),
            slug: node.slug.clone(),
            count: node.count,
            provinces,
            businesses,
        }
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::with_default_limits()
    }
}

fn country_of(business: &Business) -> String {
    let key = location_key(&business.country);
    if key.is_empty() {
        location_key(crate::models::DEFAULT_COUNTRY)
    } else {
        key
    }
}
