//! Shared harness for hub-api integration tests.
//!
//! Every test gets its own in-memory store and media host, and drives the
//! router with `oneshot` requests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use hub_api::{AppState, HubConfig, router};
use hub_auth_local::PasswordHasher;
use hub_core::{NewUser, Role, User};
use hub_media::MemoryMediaHost;
use hub_storage::MemoryStore;

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub token: String,
}

pub const PASSWORD: &str = "correct horse battery";

/// Test config: ephemeral storage, a fixed 32-byte secret.
pub fn test_config() -> HubConfig {
    let mut config = HubConfig::default();
    config.storage.ephemeral = true;
    config.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
    config
}

pub struct TestApp {
    pub state: AppState,
    pub media: Arc<MemoryMediaHost>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_media(MemoryMediaHost::new())
    }

    pub fn with_media(media: MemoryMediaHost) -> Self {
        let media = Arc::new(media);
        let state = AppState::with_components(
            &test_config(),
            Arc::new(MemoryStore::new()),
            media.clone(),
            PasswordHasher::with_cost(8, 1).unwrap(),
        )
        .unwrap();
        let router = router(state.clone());
        Self {
            state,
            media,
            router,
        }
    }

    /// Sends a request, returning status and JSON body (`Null` if empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Registers through the API with a self-assignable role.
    pub async fn register(&self, name: &str, role: &str) -> Account {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "name": name,
                    "email": email(name),
                    "password": PASSWORD,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        account(&body)
    }

    /// Creates an account directly in the store (for teachers and admins)
    /// and signs in through the API.
    pub async fn seed(&self, name: &str, role: Role) -> Account {
        let input = NewUser {
            name: name.to_string(),
            email: email(name),
            password: PASSWORD.to_string(),
            role: None,
            department: Some("Computer Science".to_string()),
            student_id: None,
        }
        .normalize()
        .unwrap();
        let hash = self.state.hash_password(PASSWORD.to_string()).await.unwrap();
        let user = User::create(input, hash, role);
        self.state.emails.claim(&user.email, user.id).await.unwrap();
        self.state.users.insert(&user).await.unwrap();
        self.login(name).await
    }

    pub async fn login(&self, name: &str) -> Account {
        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email(name), "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        account(&body)
    }

    /// Submits a proposal as `student`, supervised by `teacher`.
    pub async fn submit_proposal(&self, student: &Account, teacher: &Account, title: &str) -> String {
        let (status, body) = self
            .post(
                "/api/proposals",
                Some(&student.token),
                json!({
                    "title": title,
                    "summary": "Measure and visualise energy use across campus.",
                    "objectives": ["Collect readings", "Build dashboard"],
                    "category": "IoT",
                    "supervisor": teacher.id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    /// Moves a proposal to `status` as `reviewer`.
    pub async fn set_proposal_status(&self, reviewer: &Account, id: &str, status: &str) {
        let (code, body) = self
            .patch(
                &format!("/api/proposals/{id}"),
                Some(&reviewer.token),
                json!({ "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "{body}");
        assert_eq!(body["status"], status);
    }

    /// Submits a project for an approved proposal.
    pub async fn submit_project(&self, student: &Account, proposal: &str, tools: &[&str]) -> String {
        let (status, body) = self
            .post(
                "/api/projects",
                Some(&student.token),
                json!({
                    "proposal": proposal,
                    "title": "Campus Energy Dashboard",
                    "description": "A live dashboard of building power usage.",
                    "tools": tools,
                    "repository_url": "https://github.com/uni/energy",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    /// Approves and publishes a project as its supervisor.
    pub async fn publish_project(&self, teacher: &Account, id: &str) {
        let (status, body) = self
            .patch(
                &format!("/api/projects/{id}"),
                Some(&teacher.token),
                json!({ "status": "approved", "published": true }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["published"], true);
    }
}

pub fn email(name: &str) -> String {
    format!("{}@uni.edu", name.to_lowercase().replace(' ', "."))
}

fn account(session: &Value) -> Account {
    Account {
        id: session["user"]["id"].as_str().unwrap().to_string(),
        token: session["token"].as_str().unwrap().to_string(),
    }
}

/// Asserts the JSON error envelope.
pub fn assert_error(body: &Value, category: &str) {
    assert_eq!(body["error"]["category"], category, "{body}");
    assert!(body["error"]["message"].is_string(), "{body}");
}
