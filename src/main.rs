use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use swipe_match::config::{Settings, StorageBackend};
use swipe_match::core::{spawn_expiry_sweep, CompatibilityScorer, Directories, MatchEngine};
use swipe_match::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use swipe_match::routes::{self, AppState};
use swipe_match::services::{CacheManager, CachedDirectory, CatalogClient, EngineStore, MemoryStore, PostgresClient};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting swipe-match engine...");

    let settings = Settings::load().map_err(|e| startup_error("Configuration error", e))?;

    info!("Configuration loaded successfully");

    // Storage backend
    let store: Arc<dyn EngineStore> = match settings.database.backend {
        StorageBackend::Postgres => {
            let postgres = PostgresClient::from_settings(
                &settings.database.url,
                settings.database.max_connections,
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error("PostgreSQL connection error", e))?;

            info!(
                "PostgreSQL store initialized (max: {} connections)",
                settings.database.max_connections.unwrap_or(10)
            );
            Arc::new(postgres)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store; state is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Cache manager (optional - the engine works without it)
    let cache = if settings.cache.enabled {
        let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
        let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

        match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                Some(Arc::new(c))
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running without cache or swipe throttle", e);
                None
            }
        }
    } else {
        None
    };

    // Catalog client, behind the read-through cache when one is available
    let catalog = CatalogClient::new(
        settings.catalog.endpoint.clone(),
        settings.catalog.api_key.clone(),
        settings.catalog.timeout_secs.unwrap_or(10),
    )
    .map_err(|e| startup_error("Catalog client error", e))?;

    let directories = match &cache {
        Some(cache) => Directories::shared(Arc::new(CachedDirectory::new(catalog, cache.clone()))),
        None => Directories::shared(Arc::new(catalog)),
    };

    info!("Catalog client initialized ({})", settings.catalog.endpoint);

    let weights = settings.scoring_weights();
    let scorer = CompatibilityScorer::new(weights, settings.matching.default_radius_km);

    info!("Scorer initialized with weights: {:?}", weights);

    let engine = MatchEngine::new(store, directories, scorer, settings.matching.match_ttl_days);
    spawn_expiry_sweep(engine.clone(), settings.matching.sweep_interval_secs);

    let mut app_state = AppState::new(engine)
        .with_page_limits(settings.matching.default_limit, settings.matching.max_limit);
    if let Some(cache) = cache {
        app_state = app_state.with_cache(cache, settings.swipes.max_per_minute);
    }

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
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
