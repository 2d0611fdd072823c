//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

use anansys_backend::services::ai::{GenerationClient, GenerationError, StructuredRequest};
use anansys_backend::services::{HealthError, HealthProbe, HealthStatus};
use anansys_backend::{AppConfig, AppContext, HttpServer, RouteCatalog};

/// The route tree shipped with the crate.
pub fn routes_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("routes")
}

pub fn build_router(ctx: &AppContext) -> Router {
    let mut config = AppConfig::default();
    config.routes.dir = routes_dir();
    HttpServer::new(&config, ctx, &RouteCatalog::builtin()).router()
}

/// Generation stub that answers by schema name and records every request.
pub struct ScriptedGeneration {
    pub outputs: Vec<(&'static str, Value)>,
    pub requests: Mutex<Vec<StructuredRequest>>,
}

impl ScriptedGeneration {
    pub fn new(outputs: Vec<(&'static str, Value)>) -> Arc<Self> {
        Arc::new(Self {
            outputs,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Well-formed game state and narrator outputs.
    pub fn mystery() -> Arc<Self> {
        Self::new(vec![
            (
                "game_state_summary",
                json!({
                    "publicInfo": "The landlord is found dead in the lobby at dawn.",
                    "internalState": "The tenant in 2A poisoned the coffee.",
                }),
            ),
            (
                "narrator_turn",
                json!({
                    "story": "## Dawn\nThe lobby smells of burnt coffee.",
                    "options": [
                        { "id": "option_1", "description": "Examine the body" },
                        { "id": "option_2", "description": "Knock on 2A" },
                    ],
                    "clue_log": [],
                }),
            ),
        ])
    }

    pub fn schemas_called(&self) -> Vec<&'static str> {
        self.requests.lock().unwrap().iter().map(|r| r.schema.name).collect()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGeneration {
    async fn generate(&self, request: StructuredRequest) -> Result<Value, GenerationError> {
        let name = request.schema.name;
        self.requests.lock().unwrap().push(request);
        self.outputs
            .iter()
            .find(|(schema, _)| *schema == name)
            .map(|(_, output)| output.clone())
            .ok_or(GenerationError::EmptyCompletion)
    }
}

/// Generation client whose calls never complete.
pub struct HangingGeneration;

#[async_trait]
impl GenerationClient for HangingGeneration {
    async fn generate(&self, _request: StructuredRequest) -> Result<Value, GenerationError> {
        std::future::pending().await
    }
}

/// A valid create-session body.
pub fn session_config() -> Value {
    json!({
        "setting": "Apartment Complex",
        "suspectCount": 3,
        "murderType": "Framed",
        "twist": "None",
        "conflictStructure": "Linear",
        "killerSelectionLogic": "Based on Opportunity",
        "victimArchetype": "Powerful",
        "timeOfDay": "Morning",
        "locationCount": "Small",
        "difficultyLevel": "Easy",
    })
}

/// Start a chat completions endpoint that answers the first call with a game
/// state summary after `first_delay` and never answers later calls.
pub async fn start_stalling_upstream(first_delay: Duration) -> SocketAddr {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) > 0 {
                    return std::future::pending::<Json<Value>>().await;
                }
                tokio::time::sleep(first_delay).await;
                let summary = json!({
                    "publicInfo": "A body in the stairwell.",
                    "internalState": "The caretaker did it.",
                });
                Json(json!({
                    "choices": [{ "message": { "content": summary.to_string(), "refusal": null } }],
                }))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Health probe that always fails.
pub struct FailingProbe;

#[async_trait]
impl HealthProbe for FailingProbe {
    async fn status(&self) -> Result<HealthStatus, HealthError> {
        Err(HealthError("disk unavailable".into()))
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

    TestResponse {
        status,
        request_id,
        body,
    }
}
