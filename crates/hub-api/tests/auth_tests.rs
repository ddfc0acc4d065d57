//! Registration, login and token handling.

#![allow(clippy::unwrap_used)]

mod common;

use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use serde_json::json;

use common::{PASSWORD, TestApp, assert_error};
use hub_core::Role;

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["media"], "memory");
}

#[tokio::test]
async fn test_register_then_me() {
    let app = TestApp::new();
    let ada = app.register("Ada", "student").await;

    let (status, body) = app.get("/api/auth/me", Some(&ada.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], ada.id.as_str());
    assert_eq!(body["email"], "ada@uni.edu");
    assert_eq!(body["role"], "student");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_defaults_to_student() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Bo", "email": "Bo@Uni.edu", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["user"]["email"], "bo@uni.edu");
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn test_register_cannot_claim_privileged_role() {
    let app = TestApp::new();
    for role in ["teacher", "admin"] {
        let (status, body) = app
            .post(
                "/api/auth/register",
                None,
                json!({ "name": "Eve", "email": "eve@uni.edu", "password": PASSWORD, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
        assert_error(&body, "forbidden");
    }
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.register("Ada", "student").await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Other Ada", "email": " ADA@uni.edu ", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&body, "conflict");
}

#[tokio::test]
async fn test_register_validates_fields() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Ada", "email": "ada@uni.edu", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "password");

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Ada", "email": "not-an-email", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "email");
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = TestApp::new();
    app.register("Ada", "student").await;

    let (wrong_status, wrong) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ada@uni.edu", "password": "not the password" }),
        )
        .await;
    let (unknown_status, unknown) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "nobody@uni.edu", "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let app = TestApp::new();
    app.register("Ada", "student").await;
    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ADA@UNI.EDU", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_401_with_challenge() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/auth/me")
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(hub_api::router(app.state.clone()), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Bearer"));
}

#[tokio::test]
async fn test_bad_tokens_are_rejected() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/auth/me", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "authentication");

    let request = Request::builder()
        .uri("/api/proposals")
        .header(header::AUTHORIZATION, "Basic YWRhOnB3")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send_request(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_account_is_rejected() {
    let app = TestApp::new();
    let admin = app.seed("Root", Role::Admin).await;
    let ada = app.register("Ada", "student").await;

    let (status, _) = app.delete(&format!("/api/users/{}", ada.id), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/auth/me", Some(&ada.token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_cannot_submit() {
    let app = TestApp::new();
    let admin = app.seed("Root", Role::Admin).await;
    let grace = app.seed("Grace", Role::Teacher).await;
    let ada = app.register("Ada", "student").await;

    let (status, _) = app.delete(&format!("/api/users/{}", ada.id), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .post(
            "/api/proposals",
            Some(&ada.token),
            json!({
                "title": "Campus energy monitor",
                "summary": "Measure and visualise energy use across campus.",
                "objectives": ["Collect readings"],
                "category": "IoT",
                "supervisor": grace.id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "authentication");
    assert_eq!(app.state.proposals.list().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_demoted_admin_loses_admin_rights_at_once() {
    let app = TestApp::new();
    let root = app.seed("Root", Role::Admin).await;
    let deputy = app.seed("Deputy", Role::Admin).await;
    let ada = app.register("Ada", "student").await;

    let (status, body) = app
        .patch(&format!("/api/users/{}", deputy.id), Some(&root.token), json!({ "role": "community" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "community");

    // Same token as before the demotion.
    let (status, body) = app.get("/api/users", Some(&deputy.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "forbidden");

    for victim in [&ada.id, &root.id] {
        let (status, _) = app.delete(&format!("/api/users/{victim}"), Some(&deputy.token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    let (status, _) = app.get(&format!("/api/users/{}", root.id), Some(&root.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, me) = app.get("/api/auth/me", Some(&deputy.token)).await;
    assert_eq!(me["role"], "community");
}

#[tokio::test]
async fn test_malformed_json_is_payload_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send_request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "payload");

    let (status, body) = app
        .post("/api/auth/register", None, json!({ "name": "Ada" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error(&body, "validation");
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "not_found");
}
