use actix_web::{web, HttpResponse};

use crate::error::EngineError;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/providers/{id}/reputation", web::get().to(provider_reputation));
}

/// GET /api/v1/providers/{id}/reputation
///
/// A provider that was never rated reports a zero count.
async fn provider_reputation(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let reputation = state.engine.ratings().reputation(&path).await?;
    Ok(HttpResponse::Ok().json(reputation))
}
