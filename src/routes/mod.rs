// Route exports
pub mod matches;
pub mod providers;
pub mod swipes;

use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::core::MatchEngine;
use crate::error::EngineError;
use crate::models::HealthResponse;
use crate::services::CacheManager;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchEngine,
    /// Shared cache; `None` when running without Redis
    pub cache: Option<Arc<CacheManager>>,
    /// Per-actor swipes per minute; 0 disables the throttle
    pub swipe_limit_per_minute: u64,
    pub default_page_limit: u32,
    pub max_page_limit: u32,
}

impl AppState {
    pub fn new(engine: MatchEngine) -> Self {
        Self {
            engine,
            cache: None,
            swipe_limit_per_minute: 0,
            default_page_limit: 20,
            max_page_limit: 100,
        }
    }

    pub fn with_cache(mut self, cache: Arc<CacheManager>, swipe_limit_per_minute: u64) -> Self {
        self.cache = Some(cache);
        self.swipe_limit_per_minute = swipe_limit_per_minute;
        self
    }

    pub fn with_page_limits(mut self, default_page_limit: u32, max_page_limit: u32) -> Self {
        self.max_page_limit = max_page_limit.max(1);
        self.default_page_limit = default_page_limit.clamp(1, self.max_page_limit);
        self
    }

    /// Page size for a request: the default when absent, capped at the maximum
    pub(crate) fn page_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_limit)
            .clamp(1, self.max_page_limit)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(swipes::configure)
            .configure(matches::configure)
            .configure(providers::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_healthy = state.engine.health_check().await;
    let cache_healthy = match &state.cache {
        Some(cache) => cache.health_check().await,
        None => true,
    };

    let status = if store_healthy && cache_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run `validator` rules on a request body or query
pub(crate) fn validate_request<T: Validate>(req: &T, endpoint: &str) -> Result<(), EngineError> {
    req.validate().map_err(|errors| {
        tracing::info!("Validation failed for {} request: field_errors={:?}", endpoint, errors);
        EngineError::Validation(errors.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompatibilityScorer, Directories};
    use crate::services::{MemoryStore, StaticDirectory};

    fn state() -> AppState {
        let engine = MatchEngine::new(
            Arc::new(MemoryStore::new()),
            Directories::shared(Arc::new(StaticDirectory::new())),
            CompatibilityScorer::default(),
            30,
        );
        AppState::new(engine)
    }

    #[test]
    fn test_page_limit_uses_configured_default() {
        let state = state().with_page_limits(5, 50);

        assert_eq!(state.page_limit(None), 5);
        assert_eq!(state.page_limit(Some(30)), 30);
        assert_eq!(state.page_limit(Some(500)), 50);
        assert_eq!(state.page_limit(Some(0)), 1);
    }

    #[test]
    fn test_default_never_exceeds_maximum() {
        let state = state().with_page_limits(200, 10);
        assert_eq!(state.page_limit(None), 10);
    }
}
