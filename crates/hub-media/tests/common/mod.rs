//! A local stand-in for the media host's upload API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::json;

use hub_media::HttpMediaConfig;

/// How the fake host answers.
#[derive(Clone, Copy, Debug)]
pub enum Behaviour {
    /// Always succeed.
    Ok,
    /// Answer 503 this many times, then succeed.
    FailTimes(usize),
    /// Always answer 400 with a Cloudinary-style error body.
    BadRequest,
}

/// Fields received by the fake host in one request.
#[derive(Clone, Debug, Default)]
pub struct Received {
    pub fields: Vec<String>,
    pub upload_preset: String,
    pub folder: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: usize,
}

#[derive(Clone)]
struct FakeHost {
    behaviour: Behaviour,
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Received>>>,
}

/// A running fake host.
pub struct FakeServer {
    pub base_url: String,
    pub calls: Arc<AtomicUsize>,
    pub received: Arc<Mutex<Vec<Received>>>,
}

impl FakeServer {
    pub async fn start(behaviour: Behaviour) -> Self {
        let state = FakeHost {
            behaviour,
            calls: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        };
        let app = axum::Router::new()
            .route("/demo/auto/upload", post(upload))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            calls: state.calls,
            received: state.received,
        }
    }

    pub fn config(&self) -> HttpMediaConfig {
        HttpMediaConfig {
            base_url: self.base_url.clone(),
            min_delay: Duration::from_millis(5),
            ..HttpMediaConfig::new("demo", "hub-unsigned")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn upload(State(host): State<FakeHost>, mut multipart: Multipart) -> Response {
    let call = host.calls.fetch_add(1, Ordering::SeqCst);

    let mut received = Received::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        received.fields.push(name.clone());
        match name.as_str() {
            "file" => {
                received.file_name = field.file_name().unwrap_or_default().to_string();
                received.content_type = field.content_type().unwrap_or_default().to_string();
                received.bytes = field.bytes().await.unwrap().len();
            }
            "upload_preset" => received.upload_preset = field.text().await.unwrap(),
            "folder" => received.folder = field.text().await.unwrap(),
            _ => {}
        }
    }
    host.received.lock().unwrap().push(received.clone());

    match host.behaviour {
        Behaviour::FailTimes(n) if call < n => {
            (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response()
        }
        Behaviour::BadRequest => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Upload preset not found" } })),
        )
            .into_response(),
        _ => Json(json!({
            "secure_url": format!("https://media.test/demo/{}/{}", received.folder, received.file_name),
            "public_id": format!("{}/{}", received.folder, call + 1),
            "bytes": received.bytes,
        }))
        .into_response(),
    }
}
