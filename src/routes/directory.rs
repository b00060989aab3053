use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{build_country_index, build_hierarchy, Directory, LocationFilter};
use crate::models::{
    Business, CountryIndex, ErrorResponse, HealthResponse, ListingResponse, ProvinceHierarchy, SaunaQuery,
};
use crate::services::{BusinessSource, CacheKey, CacheManager, SourceError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn BusinessSource>,
    pub cache: Arc<CacheManager>,
    pub directory: Directory,
}

/// Configure all directory routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/provinces", web::get().to(get_provinces))
        .route("/countries", web::get().to(get_countries))
        .route("/saunas", web::get().to(list_saunas))
        .route("/featured-sauna", web::get().to(get_featured))
        .route("/locations/{location}", web::get().to(get_location))
        .route("/locations/{province}/{city}", web::get().to(get_city));
}

fn unavailable(context: &str, e: SourceError) -> HttpResponse {
    tracing::error!("{}: {}", context, e);
    HttpResponse::ServiceUnavailable().json(ErrorResponse {
        error: "Data unavailable".to_string(),
        message: e.to_string(),
        status_code: 503,
    })
}

fn not_found(message: String) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Not found".to_string(),
        message,
        status_code: 404,
    })
}

async fn fetch_all(state: &AppState) -> Result<Vec<Business>, SourceError> {
    state.source.fetch_businesses(&LocationFilter::default(), None).await
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let source_healthy = match state.source.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Record source health check failed: {}", e);
            false
        }
    };

    let status = if source_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cache: state.cache.stats(),
    })
}

/// Province → city hierarchy
///
/// GET /api/v1/provinces
///
/// ```json
/// { "ontario": { "name": "Ontario", "slug": "ontario", "count": 3,
///     "cities": { "north-bay": { "name": "North Bay", "key": "north bay", "count": 1 } } } }
/// ```
async fn get_provinces(state: web::Data<AppState>) -> impl Responder {
    let result = state
        .cache
        .get_or_compute(&CacheKey::provinces(), || async {
            let records = fetch_all(&state).await?;
            Ok::<ProvinceHierarchy, SourceError>(build_hierarchy(&records))
        })
        .await;

    match result {
        Ok(hierarchy) => {
            tracing::debug!("Serving hierarchy with {} provinces", hierarchy.len());
            HttpResponse::Ok().json(hierarchy)
        }
        Err(e) => unavailable("Failed to build province hierarchy", e),
    }
}

/// Country → province → city index
///
/// GET /api/v1/countries
async fn get_countries(state: web::Data<AppState>) -> impl Responder {
    let result = state
        .cache
        .get_or_compute(&CacheKey::countries(), || async {
            let records = fetch_all(&state).await?;
            Ok::<CountryIndex, SourceError>(build_country_index(&records))
        })
        .await;

    match result {
        Ok(countries) => HttpResponse::Ok().json(countries),
        Err(e) => unavailable("Failed to build country index", e),
    }
}

/// Ranked listing, optionally scoped to a province and city
///
/// GET /api/v1/saunas?province=ontario&city=north_bay&limit=20
///
/// `limit` must lie in `1..=listing.max_limit`; without it the configured
/// default applies.
async fn list_saunas(state: web::Data<AppState>, query: web::Query<SaunaQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for saunas query: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let max_limit = state.directory.max_limit();
    if let Some(limit) = query.limit.filter(|&limit| usize::from(limit) > max_limit) {
        tracing::info!("Rejected saunas query with limit {} above {}", limit, max_limit);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("limit: must be between 1 and {}", max_limit),
            status_code: 400,
        });
    }

    let filter = query.location_filter();

    // The whole scope is fetched so the limit cuts the ranked list, not the raw one
    let records = match state.source.fetch_businesses(&filter, None).await {
        Ok(records) => records,
        Err(e) => return unavailable("Failed to fetch saunas", e),
    };

    let result = state
        .directory
        .listing(records, &filter, query.limit.map(usize::from));

    tracing::info!(
        "Returning {} saunas for {:?} (from {} matches)",
        result.businesses.len(),
        filter,
        result.total_matches
    );

    HttpResponse::Ok().json(ListingResponse {
        businesses: result.businesses,
        total_results: result.total_matches,
    })
}

/// Featured sauna, or `null` when the directory is empty
///
/// GET /api/v1/featured-sauna
async fn get_featured(state: web::Data<AppState>) -> impl Responder {
    let result = state
        .cache
        .get_or_compute(&CacheKey::featured(), || state.source.fetch_featured())
        .await;

    match result {
        Ok(featured) => {
            tracing::debug!(
                "Featured sauna: {}",
                featured.as_ref().map(|b| b.name.as_str()).unwrap_or("none")
            );
            HttpResponse::Ok().json(featured)
        }
        Err(e) => unavailable("Failed to fetch featured sauna", e),
    }
}

/// Country or province page
///
/// GET /api/v1/locations/{location}
async fn get_location(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let slug = path.into_inner();

    let records = match fetch_all(&state).await {
        Ok(records) => records,
        Err(e) => return unavailable("Failed to fetch location data", e),
    };

    match state.directory.location_page(records, &slug) {
        Some(page) => HttpResponse::Ok().json(page),
        None => not_found(format!("No country or province matches '{}'", slug)),
    }
}

/// City page
///
/// GET /api/v1/locations/{province}/{city}
async fn get_city(state: web::Data<AppState>, path: web::Path<(String, String)>) -> impl Responder {
    let (province, city) = path.into_inner();

    let records = match state
        .source
        .fetch_businesses(&LocationFilter::province(&province), None)
        .await
    {
        Ok(records) => records,
        Err(e) => return unavailable("Failed to fetch city data", e),
    };

    match state.directory.city_page(records, &province, &city) {
        Some(page) => HttpResponse::Ok().json(page),
        None => not_found(format!("No city '{}' in '{}'", city, province)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_bodies() {
        let response = not_found("missing".to_string());
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);

        let response = unavailable("ctx", SourceError::ApiError("boom".to_string()));
        assert_eq!(response.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);
    }
}
