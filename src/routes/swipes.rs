use actix_web::{web, HttpResponse};

use crate::error::EngineError;
use crate::models::{RecordSwipeRequest, SwipeHistoryQuery, SwipeHistoryResponse, SwipeResponse};
use crate::routes::{validate_request, AppState};
use crate::services::{CacheError, CacheKey};

const THROTTLE_WINDOW_SECS: u64 = 60;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/swipes", web::post().to(record_swipe))
        .route("/swipes", web::get().to(swipe_history));
}

/// Record a swipe
///
/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// {
///   "actorId": "string",
///   "targetId": "string",
///   "targetType": "provider|service",
///   "action": "like|super_like|dislike|pass"
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    req: web::Json<RecordSwipeRequest>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*req, "record_swipe")?;
    throttle(&state, &req.actor_id).await?;

    let outcome = state
        .engine
        .swipe(&req.actor_id, &req.target_id, &req.target_type, &req.action)
        .await?;

    Ok(HttpResponse::Created().json(SwipeResponse {
        swipe: outcome.swipe,
        matched: outcome.matched,
        match_created: outcome.created,
    }))
}

/// Fixed-window per-actor throttle shared through Redis
///
/// Skipped when disabled or running without a cache.
async fn throttle(state: &AppState, actor_id: &str) -> Result<(), EngineError> {
    let limit = state.swipe_limit_per_minute;
    let Some(cache) = state.cache.as_ref().filter(|_| limit > 0) else {
        return Ok(());
    };

    let window = cache.hit(&CacheKey::swipe_window(actor_id), THROTTLE_WINDOW_SECS).await;
    throttle_decision(actor_id, window, limit)
}

/// Allow or reject a swipe given the actor's window count; a Redis failure lets it through
fn throttle_decision(actor_id: &str, window: Result<u64, CacheError>, limit: u64) -> Result<(), EngineError> {
    match window {
        Ok(count) if count > limit => {
            tracing::info!("Swipe throttle hit for {} ({} in window)", actor_id, count);
            Err(EngineError::RateLimited(format!("at most {} swipes per minute", limit)))
        }
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::warn!("Swipe throttle unavailable, allowing request: {}", e);
            Ok(())
        }
    }
}

/// GET /api/v1/swipes?actorId={actorId}&limit=20&offset=0
async fn swipe_history(
    state: web::Data<AppState>,
    query: web::Query<SwipeHistoryQuery>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*query, "swipe_history")?;

    let limit = state.page_limit(query.limit);
    let (swipes, total) = state.engine.swipes().history(&query.actor_id, limit, query.offset).await?;

    Ok(HttpResponse::Ok().json(SwipeHistoryResponse {
        swipes,
        total,
        limit,
        offset: query.offset,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_allows_up_to_limit() {
        assert!(throttle_decision("s1", Ok(1), 3).is_ok());
        assert!(throttle_decision("s1", Ok(3), 3).is_ok());
        assert!(matches!(throttle_decision("s1", Ok(4), 3), Err(EngineError::RateLimited(_))));
    }

    #[test]
    fn test_throttle_fails_open_on_redis_error() {
        let refused = redis::RedisError::from(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"));
        assert!(throttle_decision("s1", Err(CacheError::RedisError(refused)), 3).is_ok());
    }
}
