//! HTTP API tests. The router is driven in-process with `oneshot`.

use app::api::{AppState, ErrorBody, create_router};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use readrise_core::model::UserId;
use readrise_core::time::{FIXED_TEST_TIMESTAMP, fixed_clock};
use serde_json::{Value, json};
use services::{AppServices, TokenVerifier};
use tower::ServiceExt;

const SECRET: &[u8] = b"api-test-secret";

async fn test_app() -> Router {
    let services = AppServices::in_memory(fixed_clock());
    services.content().seed_default(false).await.unwrap();
    let tokens = TokenVerifier::new(SECRET, fixed_clock()).unwrap();
    create_router(AppState::new(services, Some(tokens)))
}

fn cookie_for(user: &str) -> String {
    let tokens = TokenVerifier::new(SECRET, fixed_clock()).unwrap();
    let token = tokens.issue(&UserId::new(user).unwrap(), Some(FIXED_TEST_TIMESTAMP + 3600));
    format!("token={token}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn anonymous_sees_fresh_catalog_but_cannot_play() {
    let app = test_app().await;
    let (status, levels) = send(&app, "GET", "/api/levels", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(levels.as_array().unwrap().len(), 5);
    assert_eq!(levels[0]["unlocked"], true);
    assert_eq!(levels[1]["unlocked"], false);

    let (status, body) = send(&app, "GET", "/api/play", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn forged_cookie_is_anonymous() {
    let app = test_app().await;
    let forged = TokenVerifier::new(b"someone-else", fixed_clock())
        .unwrap()
        .issue(&UserId::new("mallory").unwrap(), None);
    let cookie = format!("token={forged}");
    let (status, _) = send(&app, "GET", "/api/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_reading_cycle() {
    let app = test_app().await;
    let cookie = cookie_for("reader");
    let cookie = Some(cookie.as_str());

    let (status, view) = send(&app, "GET", "/api/play", cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "browsing_levels");
    assert_eq!(view["stats"]["name"], "reader");

    let (status, body) = send(&app, "POST", "/api/play/levels/2", cookie, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "level_locked");

    let (status, view) = send(&app, "POST", "/api/play/levels/1", cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "browsing_readings");
    assert_eq!(view["level_id"], 1);

    let (status, view) = send(&app, "POST", "/api/play/readings/1", cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "answering_questions");
    assert_eq!(view["reading"]["title"], "The Importance of Reading");

    let answer = Some(json!({ "text": "Reading matters." }));
    let (status, _) = send(&app, "PUT", "/api/play/answers/1", cookie, answer).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/api/play/submit", cookie, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "incomplete_answers");
    assert_eq!(body["unanswered"], json!([2]));

    let answer = Some(json!({ "text": "Reading signs and forms." }));
    send(&app, "PUT", "/api/play/answers/2", cookie, answer).await;
    let (status, outcome) = send(&app, "POST", "/api/play/submit", cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["earned_points"], 25);
    assert_eq!(outcome["unlocked_level"], Value::Null);
    assert_eq!(outcome["state"], "browsing_readings");
    assert_eq!(outcome["stats"]["xp"], 25);

    let (_, me) = send(&app, "GET", "/api/me", cookie, None).await;
    assert_eq!(me["completed_readings"], 1);
    assert_eq!(me["achievements"].as_array().unwrap().len(), 4);

    let (_, board) = send(&app, "GET", "/api/leaderboard?limit=5", None, None).await;
    assert_eq!(board[0]["user_id"], "reader");
    assert_eq!(board[0]["total_points"], 25);

    let (_, view) = send(&app, "POST", "/api/play/back-to-levels", cookie, None).await;
    assert_eq!(view["state"], "browsing_levels");
    assert_eq!(view["levels"][0]["completed_readings"], 1);
}

#[tokio::test]
async fn navigation_out_of_order_conflicts() {
    let app = test_app().await;
    let cookie = cookie_for("hasty");
    let (status, body) = send(&app, "POST", "/api/play/submit", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let body: ErrorBody = serde_json::from_value(body).unwrap();
    assert_eq!(body.code, "invalid_navigation");

    let (status, view) = send(&app, "POST", "/api/play/back", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "browsing_levels");
}

#[tokio::test]
async fn admin_catalog_changes_are_validated() {
    let app = test_app().await;
    let cookie = cookie_for("editor");

    let (status, _) = send(&app, "PUT", "/api/admin/levels", None, Some(json!([]))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let edits = json!([{ "op": "add_level" }]);
    let (status, body) = send(&app, "POST", "/api/admin/edits", Some(&cookie), Some(edits)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_catalog");

    let edits = json!([
        { "op": "add_level" },
        { "op": "add_reading", "level_id": 6 },
        { "op": "update_reading", "level_id": 6, "reading_id": 1, "title": "Bonus" }
    ]);
    let (status, levels) =
        send(&app, "POST", "/api/admin/edits", Some(&cookie), Some(edits)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(levels[5]["title"], "New Level 6");
    assert_eq!(levels[5]["readings"][0]["title"], "Bonus");

    let first_only = json!([levels[0].clone()]);
    let (status, stored) =
        send(&app, "PUT", "/api/admin/levels", Some(&cookie), Some(first_only)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_numeric_ids_get_a_json_error() {
    let app = test_app().await;
    let cookie = cookie_for("typo");
    let cookie = Some(cookie.as_str());

    let (status, body) = send(&app, "POST", "/api/play/levels/first", cookie, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_path");

    send(&app, "POST", "/api/play/levels/1", cookie, None).await;
    let (status, body) = send(&app, "POST", "/api/play/readings/-1", cookie, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_path");

    let answer = Some(json!({ "text": "x" }));
    let (status, body) = send(&app, "PUT", "/api/play/answers/q1", cookie, answer).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_path");

    let (_, view) = send(&app, "GET", "/api/play", cookie, None).await;
    assert_eq!(view["state"], "browsing_readings");
}
