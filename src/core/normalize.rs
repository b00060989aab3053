//! Location name normalization shared by the hierarchy builder and the
//! location filter.
//!
//! Every comparison between a URL segment, a query parameter and a stored
//! province/city goes through [`location_key`], so a slug produced for
//! navigation always resolves back to the group it came from.

/// Trim and collapse whitespace runs to a single space, keeping case
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical comparison form of a location name
///
/// Lowercases, trims, and collapses every run of whitespace, `_` or `-` into a
/// single space: `" North_Bay "`, `"north-bay"` and `"North  Bay"` all map to
/// `"north bay"`.
pub fn location_key(value: &str) -> String {
    value
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// URL slug for a location name: `"British Columbia"` → `"british-columbia"`
pub fn slugify(value: &str) -> String {
    location_key(value).replace(' ', "-")
}

/// Whether a slug (or loosely written name) refers to the given location
#[inline]
pub fn slug_matches(slug: &str, value: &str) -> bool {
    let key = location_key(slug);
    !key.is_empty() && key == location_key(value)
}

/// Display form of a location name: first letter of every word uppercased
///
/// Only the first character of each word changes, so applying it twice is the
/// same as applying it once.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
