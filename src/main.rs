use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use sauna_directory::config::{Settings, StoreBackend};
use sauna_directory::core::Directory;
use sauna_directory::routes::{self, AppState};
use sauna_directory::services::{AppwriteSource, BusinessSource, CacheManager, InMemorySource};
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn config_error(message: String) -> io::Error {
    error!("{}", message);
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn build_source(settings: &Settings) -> io::Result<Arc<dyn BusinessSource>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            let source = match &settings.store.seed_path {
                Some(path) => InMemorySource::from_file(path)
                    .map_err(|e| config_error(format!("Failed to load seed data from {}: {}", path, e)))?,
                None => {
                    warn!("Memory backend selected without store.seed_path, directory is empty");
                    InMemorySource::default()
                }
            };
            Ok(Arc::new(source))
        }
        StoreBackend::Appwrite => {
            let appwrite = settings
                .appwrite
                .as_ref()
                .ok_or_else(|| config_error("Appwrite backend selected but [appwrite] is not configured".to_string()))?;

            let mut source = AppwriteSource::new(
                appwrite.endpoint.clone(),
                appwrite.api_key.clone(),
                appwrite.project_id.clone(),
                appwrite.database_id.clone(),
                appwrite.collection.clone(),
                appwrite.timeout_secs,
            )
            .map_err(|e| config_error(format!("Failed to create document store client: {}", e)))?;

            if let Some(page_size) = appwrite.page_size {
                source = source.with_page_size(page_size);
            }

            info!("Document store client initialized (collection: {})", appwrite.collection);
            Ok(Arc::new(source))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // LOG_LEVEL / LOG_FORMAT win over the config file
    let (config_level, config_format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(config_level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(config_format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting sauna directory service...");

    let settings = settings.map_err(|e| config_error(format!("Failed to load configuration: {}", e)))?;

    info!("Configuration loaded successfully");

    let source = build_source(&settings)?;

    // Redis is optional; without it only the in-process tier is used
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(100);

    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::with_redis(url, l1_cache_size, cache_ttl).await {
            Ok(cache) => {
                info!("Cache manager initialized with Redis (TTL: {}s)", cache_ttl);
                cache
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };

    let directory = Directory::new(settings.listing.default_limit, settings.listing.max_limit);

    let app_state = AppState {
        source,
        cache: Arc::new(cache),
        directory,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
