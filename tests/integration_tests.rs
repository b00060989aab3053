// Integration tests for the sauna directory

use actix_web::{http::StatusCode, test as atest, web, App};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use sauna_directory::core::{Directory, LocationFilter};
use sauna_directory::models::{Business, LocationPage};
use sauna_directory::routes::{configure_routes, handle_query_payload_error, AppState};
use sauna_directory::services::{BusinessSource, CacheManager, InMemorySource, SourceError};

const SEED: &str = r#"[
    {"$id": "on-1", "name": "Lakeside Loyly", "province": "Ontario", "city": "North Bay", "rating": 4.7, "reviewCount": 200},
    {"$id": "on-2", "name": "One Review Wonder", "province": "ontario ", "city": "north bay", "rating": 5.0, "reviewCount": 1},
    {"$id": "on-3", "name": "Queen West Steam", "province": "ONTARIO", "city": "Toronto", "rating": 4.2, "reviewCount": 120, "featured": "Y"},
    {"$id": "on-4", "name": "New Cabin", "province": "ontario", "city": "toronto", "rating": 0, "reviewCount": 0},
    {"$id": "bc-1", "name": "Coastal Cedar", "province": "British Columbia", "city": "Vancouver", "rating": "4.9", "reviewCount": "85"},
    {"$id": "fi-1", "name": "Kulttuurisauna", "province": "Uusimaa", "city": "Helsinki", "country": "Finland", "rating": 4.8, "reviewCount": 640},
    {"$id": "xx-1", "name": "Somewhere", "province": "", "city": "", "rating": 3.0, "reviewCount": 4}
]"#;

fn records() -> Vec<Business> {
    let source = InMemorySource::from_json(SEED).unwrap();
    tokio_test::block_on(source.fetch_businesses(&LocationFilter::default(), None)).unwrap()
}

fn ids(businesses: &[Business]) -> Vec<&str> {
    businesses.iter().map(|b| b.id.as_str()).collect()
}

fn json_ids(businesses: &Value) -> Vec<String> {
    businesses
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["$id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_integration_listing_pipeline() {
    let directory = Directory::with_default_limits();

    let result = directory.listing(records(), &LocationFilter::province("ontario"), None);
    assert_eq!(result.total_matches, 4);
    assert_eq!(ids(&result.businesses), vec!["on-1", "on-3", "on-2", "on-4"]);

    let result = directory.listing(records(), &LocationFilter::city("ontario", "North_Bay"), Some(1));
    assert_eq!(result.total_matches, 2);
    assert_eq!(ids(&result.businesses), vec!["on-1"]);

    let result = directory.listing(records(), &LocationFilter::default(), Some(3));
    assert_eq!(result.total_matches, 7);
    assert_eq!(ids(&result.businesses), vec!["fi-1", "bc-1", "on-1"]);
}

#[test]
fn test_integration_pages() {
    let directory = Directory::with_default_limits();

    let page = directory.province_page(records(), "ontario").unwrap();
    assert_eq!(page.name, "Ontario");
    assert_eq!(page.count, 4);
    let cities: Vec<&str> = page.cities.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(cities, vec!["north-bay", "toronto"]);

    let city = directory.city_page(records(), "ontario", "north-bay").unwrap();
    assert_eq!(city.city.name, "North Bay");
    assert_eq!(city.province.slug, "ontario");
    assert_eq!(ids(&city.businesses), vec!["on-1", "on-2"]);

    assert!(directory.city_page(records(), "ontario", "vancouver").is_none());
    assert!(directory.province_page(records(), "atlantis").is_none());

    match directory.location_page(records(), "finland").unwrap() {
        LocationPage::Country(country) => {
            assert_eq!(country.count, 1);
            assert_eq!(country.provinces[0].name, "Uusimaa");
        }
        LocationPage::Province(_) => panic!("finland should resolve to a country"),
    }

    match directory.location_page(records(), "british-columbia").unwrap() {
        LocationPage::Province(province) => assert_eq!(ids(&province.businesses), vec!["bc-1"]),
        LocationPage::Country(_) => panic!("british-columbia should resolve to a province"),
    }

    let canada = directory.country_page(records(), "canada").unwrap();
    assert_eq!(canada.count, 5);
    assert_eq!(canada.provinces.len(), 2);
}

struct FailingSource;

#[async_trait]
impl BusinessSource for FailingSource {
    async fn fetch_businesses(
        &self,
        _filter: &LocationFilter,
        _limit: Option<usize>,
    ) -> Result<Vec<Business>, SourceError> {
        Err(SourceError::ApiError("store offline".to_string()))
    }

    async fn health_check(&self) -> Result<bool, SourceError> {
        Err(SourceError::ApiError("store offline".to_string()))
    }
}

fn state(source: Arc<dyn BusinessSource>) -> AppState {
    AppState {
        source,
        cache: Arc::new(CacheManager::in_memory(100, 60)),
        directory: Directory::new(2, 10),
    }
}

fn seeded_state() -> AppState {
    state(Arc::new(InMemorySource::from_json(SEED).unwrap()))
}

macro_rules! app {
    ($state:expr) => {
        atest::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_routes_provinces() {
    let app = app!(seeded_state());

    let req = atest::TestRequest::get().uri("/api/v1/provinces").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;

    let provinces = body.as_object().unwrap();
    assert_eq!(provinces.len(), 3);
    assert_eq!(body["ontario"]["count"], 4);
    assert_eq!(body["ontario"]["cities"]["north-bay"]["name"], "North Bay");
    assert_eq!(body["british columbia"]["slug"], "british-columbia");
}

#[actix_web::test]
async fn test_routes_countries() {
    let app = app!(seeded_state());

    let req = atest::TestRequest::get().uri("/api/v1/countries").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;

    assert_eq!(body["Canada"]["count"], 5);
    assert_eq!(body["Finland"]["provinces"]["uusimaa"]["count"], 1);
}

#[actix_web::test]
async fn test_routes_listing() {
    let app = app!(seeded_state());

    let req = atest::TestRequest::get()
        .uri("/api/v1/saunas?province=Ontario&city=north_bay")
        .to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_results"], 2);
    assert_eq!(json_ids(&body["businesses"]), vec!["on-1", "on-2"]);

    // Directory default limit is 2
    let req = atest::TestRequest::get().uri("/api/v1/saunas?province=ontario").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_results"], 4);
    assert_eq!(json_ids(&body["businesses"]), vec!["on-1", "on-3"]);
}

#[actix_web::test]
async fn test_routes_listing_rejects_bad_queries() {
    let app = app!(seeded_state());

    let req = atest::TestRequest::get().uri("/api/v1/saunas?limit=0").to_request();
    let resp = atest::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Above the configured maximum of 10
    let req = atest::TestRequest::get().uri("/api/v1/saunas?limit=11").to_request();
    let resp = atest::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = atest::TestRequest::get().uri("/api/v1/saunas?limit=10").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["businesses"].as_array().unwrap().len(), 7);

    let req = atest::TestRequest::get().uri("/api/v1/saunas?limit=lots").to_request();
    let resp = atest::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = atest::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_query");
}

#[actix_web::test]
async fn test_routes_featured() {
    let app = app!(seeded_state());

    let req = atest::TestRequest::get().uri("/api/v1/featured-sauna").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["$id"], "on-3");

    let empty = app!(state(Arc::new(InMemorySource::default())));
    let req = atest::TestRequest::get().uri("/api/v1/featured-sauna").to_request();
    let body: Value = atest::call_and_read_body_json(&empty, req).await;
    assert!(body.is_null());
}

#[actix_web::test]
async fn test_routes_locations() {
    let app = app!(seeded_state());

    let req = atest::TestRequest::get().uri("/api/v1/locations/ontario").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["type"], "province");
    assert_eq!(body["name"], "Ontario");

    let req = atest::TestRequest::get().uri("/api/v1/locations/canada").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["type"], "country");
    assert_eq!(body["businesses"].as_array().unwrap().len(), 2);

    let req = atest::TestRequest::get()
        .uri("/api/v1/locations/ontario/north_bay")
        .to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["city"]["slug"], "north-bay");
    assert_eq!(json_ids(&body["businesses"]), vec!["on-1", "on-2"]);

    let req = atest::TestRequest::get().uri("/api/v1/locations/atlantis").to_request();
    let resp = atest::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = atest::TestRequest::get()
        .uri("/api/v1/locations/ontario/atlantis")
        .to_request();
    let resp = atest::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_routes_source_failure() {
    let app = app!(state(Arc::new(FailingSource)));

    for uri in [
        "/api/v1/provinces",
        "/api/v1/countries",
        "/api/v1/saunas",
        "/api/v1/featured-sauna",
        "/api/v1/locations/ontario",
        "/api/v1/locations/ontario/toronto",
    ] {
        let req = atest::TestRequest::get().uri(uri).to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        let body: Value = atest::read_body_json(resp).await;
        assert_eq!(body["error"], "Data unavailable");
    }

    let req = atest::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "degraded");
}

#[actix_web::test]
async fn test_routes_health() {
    let app = app!(seeded_state());

    let req = atest::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["cache"]["redis_enabled"], false);
    assert_eq!(body["cache"]["ttl_secs"], 60);
}
