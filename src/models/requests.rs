use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::LocationFilter;

/// Query string of the listing endpoint
///
/// `GET /api/v1/saunas?province=ontario&city=north_bay&limit=20`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SaunaQuery {
    #[validate(length(max = 100))]
    pub province: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    /// Hard ceiling; the handler also rejects values above `listing.max_limit`
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u16>,
}

impl SaunaQuery {
    pub fn location_filter(&self) -> LocationFilter {
        LocationFilter::new(self.province.as_deref(), self.city.as_deref())
    }
}
