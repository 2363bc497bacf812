use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{
    Booking, MatchListResponse, MatchSummary, ParticipantActionRequest, ParticipantQuery, RateMatchRequest,
    RatingResponse, Role,
};
use crate::routes::{validate_request, AppState};

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/matches", web::get().to(list_matches))
        // Registered before /matches/{id} so "stats" is not parsed as an id
        .route("/matches/stats", web::get().to(match_stats))
        .route("/matches/{id}", web::get().to(get_match))
        .route("/matches/{id}/accept", web::patch().to(accept_match))
        .route("/matches/{id}/decline", web::patch().to(decline_match))
        .route("/matches/{id}/archive", web::patch().to(archive_match))
        .route("/matches/{id}/view", web::patch().to(view_match))
        .route("/matches/{id}/message", web::patch().to(message_match))
        .route("/matches/{id}/complete", web::patch().to(complete_match))
        .route("/matches/{id}/cancel", web::patch().to(cancel_match))
        .route("/matches/{id}/rate", web::post().to(rate_match))
        .route("/matches/{id}/booking", web::put().to(update_booking));
}

/// GET /api/v1/matches?participantId={id}&limit=20&offset=0
///
/// Non-archived matches of a participant, most recent activity first.
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<ParticipantQuery>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*query, "list_matches")?;

    let limit = state.page_limit(query.limit);
    let matches = state
        .engine
        .lifecycle()
        .list_for_participant(&query.participant_id, limit, query.offset)
        .await?;

    tracing::debug!("Returning {} matches for {}", matches.len(), query.participant_id);

    Ok(HttpResponse::Ok().json(MatchListResponse {
        matches,
        limit,
        offset: query.offset,
    }))
}

/// GET /api/v1/matches/stats?participantId={id}
async fn match_stats(
    state: web::Data<AppState>,
    query: web::Query<ParticipantQuery>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*query, "match_stats")?;

    let mut stats = state.engine.lifecycle().stats(&query.participant_id).await?;
    stats.participant_id = query.participant_id.clone();

    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/v1/matches/{id}
async fn get_match(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, EngineError> {
    let m = state.engine.lifecycle().get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(m))
}

/// PATCH /api/v1/matches/{id}/accept
///
/// Accept, decline and archive respond with the match summary.
///
/// Request body:
/// ```json
/// { "byUserId": "string" }
/// ```
async fn accept_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ParticipantActionRequest>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*req, "accept_match")?;
    let m = state.engine.lifecycle().accept(path.into_inner(), &req.by_user_id).await?;
    Ok(HttpResponse::Ok().json(MatchSummary::from(&m)))
}

/// PATCH /api/v1/matches/{id}/decline
async fn decline_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ParticipantActionRequest>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*req, "decline_match")?;
    let m = state.engine.lifecycle().decline(path.into_inner(), &req.by_user_id).await?;
    Ok(HttpResponse::Ok().json(MatchSummary::from(&m)))
}

/// PATCH /api/v1/matches/{id}/archive
async fn archive_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ParticipantActionRequest>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*req, "archive_match")?;
    let m = state.engine.lifecycle().archive(path.into_inner(), &req.by_user_id).await?;
    Ok(HttpResponse::Ok().json(MatchSummary::from(&m)))
}

/// PATCH /api/v1/matches/{id}/view
async fn view_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ParticipantActionRequest>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*req, "view_match")?;
    let m = state.engine.lifecycle().mark_viewed(path.into_inner(), &req.by_user_id).await?;
    Ok(HttpResponse::Ok().json(m))
}

/// PATCH /api/v1/matches/{id}/message
///
/// Called by the message transport when a participant first writes in the room.
async fn message_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ParticipantActionRequest>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*req, "message_match")?;
    let m = state.engine.lifecycle().mark_messaged(path.into_inner(), &req.by_user_id).await?;
    Ok(HttpResponse::Ok().json(m))
}

/// PATCH /api/v1/matches/{id}/complete
async fn complete_match(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, EngineError> {
    let m = state.engine.lifecycle().complete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(m))
}

/// PATCH /api/v1/matches/{id}/cancel
async fn cancel_match(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, EngineError> {
    let m = state.engine.lifecycle().cancel(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(m))
}

/// Rate a match
///
/// POST /api/v1/matches/{id}/rate
///
/// Request body:
/// ```json
/// {
///   "byRole": "seeker|provider",
///   "rating": 1,
///   "feedback": "optional string"
/// }
/// ```
async fn rate_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<RateMatchRequest>,
) -> Result<HttpResponse, EngineError> {
    validate_request(&*req, "rate_match")?;
    let role: Role = req.by_role.parse().map_err(EngineError::Validation)?;

    let req = req.into_inner();
    let (rated, reputation) = state
        .engine
        .ratings()
        .submit_rating(path.into_inner(), role, req.rating, req.feedback)
        .await?;

    Ok(HttpResponse::Ok().json(RatingResponse {
        match_id: rated.id,
        feedback: rated.feedback,
        reputation,
    }))
}

/// PUT /api/v1/matches/{id}/booking
///
/// Request body:
/// ```json
/// {
///   "status": "requested|confirmed|completed|cancelled",
///   "scheduledAt": "2025-01-01T10:00:00Z",
///   "amount": 150.0,
///   "paymentStatus": "pending|paid|failed|refunded"
/// }
/// ```
async fn update_booking(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<Booking>,
) -> Result<HttpResponse, EngineError> {
    let m = state.engine.lifecycle().update_booking(path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(m))
}
