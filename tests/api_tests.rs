// HTTP API tests for Swipe Match

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use swipe_match::core::{Directories, MatchEngine};
use swipe_match::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use swipe_match::models::{Role, SeekerAttributes, TargetAttributes};
use swipe_match::routes::{configure_routes, AppState};
use swipe_match::services::{MemoryStore, StaticDirectory};
use swipe_match::CompatibilityScorer;

fn state() -> AppState {
    let directory = StaticDirectory::new()
        .with_provider("P1", TargetAttributes::default())
        .with_actor("S1", Role::Seeker, SeekerAttributes::default())
        .with_actor("P1", Role::Provider, SeekerAttributes::default());

    let engine = MatchEngine::new(
        Arc::new(MemoryStore::new()),
        Directories::shared(Arc::new(directory)),
        CompatibilityScorer::default(),
        30,
    );

    AppState::new(engine)
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
                .app_data(web::PathConfig::default().error_handler(handle_path_error))
                .configure(configure_routes),
        )
        .await
    };
}

fn swipe_body(action: &str) -> Value {
    json!({
        "actorId": "S1",
        "targetId": "P1",
        "targetType": "provider",
        "action": action,
    })
}

#[actix_web::test]
async fn test_health() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_swipe_then_duplicate_is_409() {
    let app = app!();

    let req = test::TestRequest::post().uri("/api/v1/swipes").set_json(swipe_body("like")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["match"]["status"], "pending");
    assert_eq!(body["matchCreated"], true);

    let req = test::TestRequest::post().uri("/api/v1/swipes").set_json(swipe_body("like")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "duplicate_swipe");
}

#[actix_web::test]
async fn test_invalid_enum_and_missing_fields_are_400() {
    let app = app!();

    let req = test::TestRequest::post().uri("/api/v1/swipes").set_json(swipe_body("love")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipes")
        .set_json(json!({ "actorId": "S1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_unknown_target_is_404() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/v1/swipes")
        .set_json(json!({ "actorId": "S1", "targetId": "nobody", "targetType": "provider", "action": "pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_accept_rate_and_reputation() {
    let app = app!();

    let req = test::TestRequest::post().uri("/api/v1/swipes").set_json(swipe_body("like")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let match_id = body["match"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/matches/{}/accept", match_id))
        .set_json(json!({ "byUserId": "P1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "active");
    assert!(body["chatRoomId"].is_string());
    assert!(body["score"].is_number());
    // Summary only; the full match is served by GET /matches/{id}
    assert!(body.get("interactions").is_none());

    // Out-of-range rating
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/matches/{}/rate", match_id))
        .set_json(json!({ "byRole": "seeker", "rating": 6 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/matches/{}/rate", match_id))
        .set_json(json!({ "byRole": "seeker", "rating": 5, "feedback": "Clear advice" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["feedback"]["seekerRating"], 5);
    assert_eq!(body["reputation"]["count"], 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/matches/{}/rate", match_id))
        .set_json(json!({ "byRole": "seeker", "rating": 3 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get().uri("/api/v1/providers/P1/reputation").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["average"], 5.0);
}

#[actix_web::test]
async fn test_non_participant_is_403() {
    let app = app!();

    let req = test::TestRequest::post().uri("/api/v1/swipes").set_json(swipe_body("like")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let match_id = body["match"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/matches/{}/decline", match_id))
        .set_json(json!({ "byUserId": "intruder" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_listing_and_stats() {
    let app = app!();

    let req = test::TestRequest::post().uri("/api/v1/swipes").set_json(swipe_body("super_like")).to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/v1/matches?participantId=P1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matches"].as_array().unwrap().len(), 1);
    assert_eq!(body["limit"], 20);

    let req = test::TestRequest::get().uri("/api/v1/matches/stats?participantId=S1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["pending"], 1);
    assert_eq!(body["total"], 1);

    let req = test::TestRequest::get().uri("/api/v1/swipes?actorId=S1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
}

#[actix_web::test]
async fn test_malformed_match_id_is_400() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/v1/matches/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_complete_pending_is_409() {
    let app = app!();

    let req = test::TestRequest::post().uri("/api/v1/swipes").set_json(swipe_body("like")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let match_id = body["match"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/matches/{}/complete", match_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_state_transition");
}

#[actix_web::test]
async fn test_archive_returns_summary_with_status_kept() {
    let app = app!();

    let req = test::TestRequest::post().uri("/api/v1/swipes").set_json(swipe_body("like")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let match_id = body["match"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/matches/{}/archive", match_id))
        .set_json(json!({ "byUserId": "S1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], match_id.as_str());
    assert_eq!(body["status"], "pending");
    assert_eq!(body["isActive"], false);
    assert_eq!(body["seekerId"], "S1");
    assert!(body.get("compatibility").is_none());
}
