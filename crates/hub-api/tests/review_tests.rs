//! Feedback, comments and the public showcase.

#![allow(clippy::unwrap_used)]

mod common;

use http::StatusCode;
use serde_json::{Value, json};

use common::{Account, TestApp, assert_error};
use hub_core::Role;

fn feedback() -> Value {
    json!({
        "ratings": { "originality": 4, "feasibility": 3, "methodology": 5, "presentation": 4 },
        "strengths": ["Clear scope"],
        "improvements": ["Cite related work"],
        "comment": "Good start.",
    })
}

struct Published {
    app: TestApp,
    teacher: Account,
    student: Account,
    project: String,
}

async fn published_project() -> Published {
    let app = TestApp::new();
    let teacher = app.seed("Grace", Role::Teacher).await;
    let student = app.register("Ada", "student").await;
    let proposal = app.submit_proposal(&student, &teacher, "Energy monitor").await;
    app.set_proposal_status(&teacher, &proposal, "approved").await;
    let project = app.submit_project(&student, &proposal, &["Rust", "PostgreSQL"]).await;
    app.publish_project(&teacher, &project).await;
    Published {
        app,
        teacher,
        student,
        project,
    }
}

#[tokio::test]
async fn test_supervisor_feedback_starts_review() {
    let app = TestApp::new();
    let teacher = app.seed("Grace", Role::Teacher).await;
    let student = app.register("Ada", "student").await;
    let id = app.submit_proposal(&student, &teacher, "Energy monitor").await;
    let uri = format!("/api/proposals/{id}/feedback");

    let (status, _) = app.post(&uri, Some(&student.token), feedback()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&uri, Some(&teacher.token), feedback()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reviewer"], teacher.id.as_str());
    assert_eq!(body["reviewer_name"], "Grace");

    let (_, proposal) = app.get(&format!("/api/proposals/{id}"), Some(&student.token)).await;
    assert_eq!(proposal["status"], "under_review");
    assert_eq!(proposal["feedback"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_feedback_ratings_are_validated() {
    let app = TestApp::new();
    let teacher = app.seed("Grace", Role::Teacher).await;
    let student = app.register("Ada", "student").await;
    let id = app.submit_proposal(&student, &teacher, "Energy monitor").await;

    let mut body = feedback();
    body["ratings"]["feasibility"] = json!(9);
    let (status, body) = app
        .post(&format!("/api/proposals/{id}/feedback"), Some(&teacher.token), body)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "ratings.feasibility");
}

#[tokio::test]
async fn test_only_reviewer_or_admin_removes_feedback() {
    let app = TestApp::new();
    let teacher = app.seed("Grace", Role::Teacher).await;
    let admin = app.seed("Root", Role::Admin).await;
    let student = app.register("Ada", "student").await;
    let id = app.submit_proposal(&student, &teacher, "Energy monitor").await;

    let (_, first) = app
        .post(&format!("/api/proposals/{id}/feedback"), Some(&teacher.token), feedback())
        .await;
    let (_, second) = app
        .post(&format!("/api/proposals/{id}/feedback"), Some(&teacher.token), feedback())
        .await;
    let first = format!("/api/proposals/{id}/feedback/{}", first["id"].as_str().unwrap());
    let second = format!("/api/proposals/{id}/feedback/{}", second["id"].as_str().unwrap());

    let (status, _) = app.delete(&first, Some(&student.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&first, Some(&teacher.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&first, Some(&teacher.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&second, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, proposal) = app.get(&format!("/api/proposals/{id}"), Some(&student.token)).await;
    assert!(proposal["feedback"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_comments_on_private_proposal() {
    let app = TestApp::new();
    let teacher = app.seed("Grace", Role::Teacher).await;
    let student = app.register("Ada", "student").await;
    let stranger = app.register("Bo", "student").await;
    let id = app.submit_proposal(&student, &teacher, "Energy monitor").await;
    let uri = format!("/api/proposals/{id}/comments");

    let (status, _) = app.post(&uri, Some(&stranger.token), json!({ "body": "Hi" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, comment) = app
        .post(&uri, Some(&student.token), json!({ "body": "  Is the scope right?  " }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["body"], "Is the scope right?");
    assert_eq!(comment["author_name"], "Ada");

    let (status, body) = app.post(&uri, Some(&teacher.token), json!({ "body": "   " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["field"], "body");

    let comment_uri = format!("{uri}/{}", comment["id"].as_str().unwrap());
    let (status, _) = app.delete(&comment_uri, Some(&teacher.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&comment_uri, Some(&student.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_public_project_is_open_to_visitors() {
    let Published { app, project, .. } = published_project().await;
    let visitor = app.register("Vi", "community").await;
    let uri = format!("/api/projects/{project}");

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["published"], true);

    // Visitors may comment once signed in.
    let (status, _) = app.post(&format!("{uri}/comments"), None, json!({ "body": "Nice!" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .post(&format!("{uri}/comments"), Some(&visitor.token), json!({ "body": "Nice!" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // But never review.
    let (status, _) = app.post(&format!("{uri}/feedback"), Some(&visitor.token), feedback()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unpublished_project_is_hidden() {
    let app = TestApp::new();
    let teacher = app.seed("Grace", Role::Teacher).await;
    let student = app.register("Ada", "student").await;
    let visitor = app.register("Vi", "community").await;
    let proposal = app.submit_proposal(&student, &teacher, "Energy monitor").await;
    app.set_proposal_status(&teacher, &proposal, "approved").await;
    let project = app.submit_project(&student, &proposal, &["Rust"]).await;
    let uri = format!("/api/projects/{project}");

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "not_found");
    let (status, _) = app.get(&uri, Some(&visitor.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&uri, Some(&student.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, showcase) = app.get("/api/projects/public", None).await;
    assert_eq!(showcase["total"], 0);
}

#[tokio::test]
async fn test_showcase_search_and_tool_filter() {
    let Published {
        app,
        teacher,
        student,
        project,
    } = published_project().await;

    let second = app.submit_proposal(&student, &teacher, "Library bot").await;
    app.set_proposal_status(&teacher, &second, "approved").await;
    let (status, body) = app
        .post(
            "/api/projects",
            Some(&student.token),
            json!({
                "proposal": second,
                "title": "Library Helper",
                "description": "Chat assistant for the library catalogue.",
                "tools": ["Python"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let helper = body["id"].as_str().unwrap().to_string();
    app.publish_project(&teacher, &helper).await;

    let (_, all) = app.get("/api/projects/public", None).await;
    assert_eq!(all["total"], 2);

    let (_, by_query) = app.get("/api/projects/public?q=catalogue", None).await;
    assert_eq!(by_query["total"], 1);
    assert_eq!(by_query["items"][0]["id"], helper.as_str());

    let (_, by_tool) = app.get("/api/projects/public?tool=rust", None).await;
    assert_eq!(by_tool["total"], 1);
    assert_eq!(by_tool["items"][0]["id"], project.as_str());

    let (_, none) = app.get("/api/projects/public?q=catalogue&tool=rust", None).await;
    assert_eq!(none["total"], 0);
}
