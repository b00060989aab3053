use std::collections::{BTreeMap, HashMap};

use crate::core::normalize::{collapse_whitespace, location_key, slug_matches, slugify, title_case};
use crate::models::{Business, CityNode, CountryIndex, CountryNode, ProvinceHierarchy, ProvinceNode};

/// Group a flat list of businesses into a province → city tree with counts
///
/// Provinces and cities are grouped on their [`location_key`], so `"Ontario"`,
/// `"ontario"` and `" Ontario "` end up in one node. The map key is the first
/// spelling seen in the input (whitespace collapsed); cities are keyed by slug.
/// Records missing a province or city are left out.
pub fn build_hierarchy<'a, I>(records: I) -> ProvinceHierarchy
where
    I: IntoIterator<Item = &'a Business>,
{
    let mut hierarchy = ProvinceHierarchy::new();
    // location key -> map key of the province group
    let mut province_keys: HashMap<String, String> = HashMap::new();
    let mut skipped = 0usize;

    for business in records {
        let province_key = location_key(&business.province);
        let city_slug = slugify(&business.city);

        if province_key.is_empty() || city_slug.is_empty() {
            skipped += 1;
            continue;
        }

        let map_key = province_keys
            .entry(province_key)
            .or_insert_with(|| collapse_whitespace(&business.province))
            .clone();

        let province = hierarchy.entry(map_key).or_insert_with_key(|key| ProvinceNode {
            name: title_case(key),
            slug: slugify(key),
            count: 0,
            cities: BTreeMap::new(),
        });
        province.count += 1;

        let city = province.cities.entry(city_slug).or_insert_with(|| {
            let stored = collapse_whitespace(&business.city);
            CityNode {
                name: title_case(&stored),
                key: stored,
                count: 0,
            }
        });
        city.count += 1;
    }

    if skipped > 0 {
        tracing::debug!("Left {} businesses without province/city out of the hierarchy", skipped);
    }

    hierarchy
}

/// Group businesses by country, each with its own province hierarchy
///
/// Countries are grouped like provinces; a blank country counts as Canada.
pub fn build_country_index<'a, I>(records: I) -> CountryIndex
where
    I: IntoIterator<Item = &'a Business>,
{
    let mut groups: BTreeMap<String, (String, Vec<&'a Business>)> = BTreeMap::new();

    for business in records {
        let mut country = collapse_whitespace(&business.country);
        if country.is_empty() {
            country = crate::models::DEFAULT_COUNTRY.to_string();
        }
        groups
            .entry(location_key(&country))
            .or_insert_with(|| (country, Vec::new()))
            .1
            .push(business);
    }

    groups
        .into_values()
        .filter_map(|(country, members)| {
            let provinces = build_hierarchy(members);
            if provinces.is_empty() {
                return None;
            }
            let count = provinces.values().map(|p| p.count).sum();
            let node = CountryNode {
                name: title_case(&country),
                slug: slugify(&country),
                count,
                provinces,
            };
            Some((country, node))
        })
        .collect()
}

/// Find the province a slug refers to
///
/// There is no slug index: every province key is re-slugified and compared.
pub fn find_province_by_slug<'a>(
    hierarchy: &'a ProvinceHierarchy,
    slug: &str,
) -> Option<(&'a str, &'a ProvinceNode)> {
    hierarchy
        .iter()
        .find(|(key, _)| slug_matches(slug, key))
        .map(|(key, node)| (key.as_str(), node))
}

/// Find a city of a province by slug (or loosely written name)
pub fn find_city_by_slug<'a>(province: &'a ProvinceNode, slug: &str) -> Option<&'a CityNode> {
    province.cities.get(&slugify(slug))
}

/// What a single-segment location URL points at
#[derive(Debug, Clone, Copy)]
pub enum LocationMatch<'a> {
    Country {
        key: &'a str,
        node: &'a CountryNode,
    },
    Province {
        country: &'a str,
        key: &'a str,
        node: &'a ProvinceNode,
    },
}

/// Resolve a slug to a country or, failing that, a province of any country
pub fn resolve_location<'a>(countries: &'a CountryIndex, slug: &str) -> Option<LocationMatch<'a>> {
    if let Some((key, node)) = countries.iter().find(|(key, _)| slug_matches(slug, key)) {
        return Some(LocationMatch::Country { key, node });
    }

    countries.iter().find_map(|(country, node)| {
        find_province_by_slug(&node.provinces, slug).map(|(key, province)| LocationMatch::Province {
            country,
            key,
            node: province,
        })
    })
}
