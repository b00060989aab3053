use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::core::normalize::collapse_whitespace;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_ADDRESS_LEN: usize = 200;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_WEBSITE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_HOURS_LEN: usize = 200;
pub const MAX_RATING: f64 = 5.0;
pub const DEFAULT_COUNTRY: &str = "Canada";

/// A sauna facility as stored in the document store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    #[serde(rename = "$id", alias = "_id", alias = "id", default, deserialize_with = "lenient_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub province: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default = "default_country", deserialize_with = "lenient_country")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "postalCode", default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: f64,
    #[serde(rename = "reviewCount", default, deserialize_with = "lenient_count")]
    pub review_count: u32,
    #[serde(flatten)]
    pub categories: CategoryFlags,
    #[serde(default)]
    pub featured: TriState,
    #[serde(rename = "photoUrl", default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "workingHours", default)]
    pub working_hours: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_from_str")]
    pub sauna_type: SaunaType,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(rename = "priceRange", default, deserialize_with = "lenient_from_str")]
    pub price_range: PriceRange,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Business {
    /// Create a minimal record with everything else at its default
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        province: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            province: province.into(),
            city: city.into(),
            country: default_country(),
            location: None,
            address: None,
            postal_code: None,
            phone: None,
            website: None,
            email: None,
            rating: 0.0,
            review_count: 0,
            categories: CategoryFlags::default(),
            featured: TriState::Unknown,
            photo_url: None,
            description: None,
            working_hours: None,
            sauna_type: SaunaType::default(),
            amenities: Vec::new(),
            price_range: PriceRange::default(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_rating(mut self, rating: f64, review_count: u32) -> Self {
        self.rating = rating;
        self.review_count = review_count;
        self
    }

    /// Bring a raw record in line with the data model invariants
    ///
    /// Province and city are lowercased with whitespace runs collapsed, rating is
    /// clamped to [0, 5] and bounded text fields are truncated.
    pub fn normalized(mut self) -> Self {
        self.province = collapse_whitespace(&self.province).to_lowercase();
        self.city = collapse_whitespace(&self.city).to_lowercase();

        let country = collapse_whitespace(&self.country);
        self.country = if country.is_empty() { default_country() } else { country };

        self.rating = clamp_rating(self.rating);
        self.name = truncate(&self.name, MAX_NAME_LEN);
        self.address = self.address.map(|s| truncate(&s, MAX_ADDRESS_LEN));
        self.phone = self.phone.map(|s| truncate(&s, MAX_PHONE_LEN));
        self.website = self.website.map(|s| truncate(&s, MAX_WEBSITE_LEN));
        self.description = self.description.map(|s| truncate(&s, MAX_DESCRIPTION_LEN));
        self.working_hours = self.working_hours.map(|s| truncate(&s, MAX_HOURS_LEN));
        self
    }

    /// Whether the record has both a province and a city to hang it on
    pub fn has_location(&self) -> bool {
        !self.province.trim().is_empty() && !self.city.trim().is_empty()
    }

    pub fn is_featured(&self) -> bool {
        self.featured.is_yes()
    }
}

/// Clamp a rating into [0, 5]; non-finite values become 0
#[inline]
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_finite() {
        rating.clamp(0.0, MAX_RATING)
    } else {
        0.0
    }
}

/// Truncate to `max` characters, ending in "..." when shortened
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

/// GeoJSON point, coordinates stored as [longitude, latitude]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    #[serde(rename = "type", default)]
    kind: PointKind,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum PointKind {
    #[default]
    Point,
}

/// Yes / No / Unknown flag, stored as "Y" / "N" / ""
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriState {
    Yes,
    No,
    #[default]
    Unknown,
}

impl TriState {
    pub fn is_yes(self) -> bool {
        self == TriState::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriState::Yes => "Y",
            TriState::No => "N",
            TriState::Unknown => "",
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(true) => TriState::Yes,
            Value::Bool(false) => TriState::No,
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "y" | "yes" | "true" => TriState::Yes,
                "n" | "no" | "false" => TriState::No,
                _ => TriState::Unknown,
            },
            _ => TriState::Unknown,
        }
    }
}

impl Serialize for TriState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TriState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(TriState::from_value(&value))
    }
}

/// Category attributes of a sauna, each one possibly unknown
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryFlags {
    #[serde(default)]
    pub traditional: TriState,
    #[serde(rename = "wood", default)]
    pub wood_fired: TriState,
    #[serde(default)]
    pub infrared: TriState,
    #[serde(default)]
    pub hot_tub: TriState,
    #[serde(default)]
    pub cold_plunge: TriState,
    #[serde(default)]
    pub steam: TriState,
    #[serde(default)]
    pub private: TriState,
    #[serde(default)]
    pub public: TriState,
    #[serde(default)]
    pub mobile: TriState,
    #[serde(rename = "gay", default)]
    pub inclusive_friendly: TriState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SaunaType {
    Finnish,
    Infrared,
    Steam,
    Outdoor,
    #[default]
    Other,
}

impl FromStr for SaunaType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finnish" => Ok(SaunaType::Finnish),
            "infrared" => Ok(SaunaType::Infrared),
            "steam" => Ok(SaunaType::Steam),
            "outdoor" => Ok(SaunaType::Outdoor),
            "other" => Ok(SaunaType::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    #[default]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl FromStr for PriceRange {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "$" => Ok(PriceRange::Budget),
            "$$" => Ok(PriceRange::Moderate),
            "$$$" => Ok(PriceRange::Expensive),
            "$$$$" => Ok(PriceRange::Luxury),
            _ => Err(()),
        }
    }
}

// Lenient field decoding. Source data is imported from spreadsheets, so numbers
// arrive as strings, flags as booleans and ids as Mongo-style objects.

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(numeric(&value).map(clamp_rating).unwrap_or(0.0))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let count = match numeric(&value) {
        Some(n) if n.is_finite() && n > 0.0 => n.floor().min(u32::MAX as f64) as u32,
        _ => 0,
    };
    Ok(count)
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_country<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let country = lenient_string(deserializer)?;
    Ok(if country.trim().is_empty() { default_country() } else { country })
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Object(map) => map
            .get("$oid")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    })
}

fn lenient_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

/// Derived province → city view of the directory, keyed by province as stored
pub type ProvinceHierarchy = BTreeMap<String, ProvinceNode>;

/// One province in the location tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvinceNode {
    pub name: String,
    pub slug: String,
    pub count: usize,
    /// Cities keyed by slug
    pub cities: BTreeMap<String, CityNode>,
}

/// One city in the location tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityNode {
    pub name: String,
    /// City as stored in the source data
    pub key: String,
    pub count: usize,
}

/// Country → province → city view, keyed by country as stored
pub type CountryIndex = BTreeMap<String, CountryNode>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryNode {
    pub name: String,
    pub slug: String,
    pub count: usize,
    pub provinces: ProvinceHierarchy,
}
