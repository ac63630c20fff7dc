// tests/common/mod.rs — Shared mocks for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use qarelay::infra::errors::QaRelayError;
use qarelay::provider::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};

/// A provider that replays scripted results and records every request.
/// Once the script runs out it keeps answering with `fallback`.
pub struct ScriptedProvider {
    id: String,
    script: Mutex<VecDeque<Result<String, QaRelayError>>>,
    fallback: String,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(id: &str, fallback: &str) -> Self {
        Self {
            id: id.to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback: fallback.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn then_ok(self, content: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(content.to_string()));
        self
    }

    pub fn then_err(self, error: QaRelayError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn models_asked(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.model.clone())
            .collect()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Scripted"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, QaRelayError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()));
        next.map(|content| ChatResponse {
            content,
            usage: TokenUsage::default(),
        })
    }
}

/// What the mock HTTP endpoint saw.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

struct MockState {
    status: StatusCode,
    body: String,
    retry_after: Option<&'static str>,
    seen: Mutex<Vec<SeenRequest>>,
}

/// Handle to an in-process chat-completions server.
pub struct MockEndpoint {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockEndpoint {
    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

async fn chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.seen.lock().unwrap().push(SeenRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    match state.retry_after {
        Some(secs) => (state.status, [("retry-after", secs)], state.body.clone()).into_response(),
        None => (state.status, state.body.clone()).into_response(),
    }
}

/// Serve `POST /v1/chat/completions` with a fixed status and body on a random port.
pub async fn start_mock_endpoint(
    status: u16,
    body: &str,
    retry_after: Option<&'static str>,
) -> MockEndpoint {
    let state = Arc::new(MockState {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        retry_after,
        seen: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockEndpoint {
        base_url: format!("http://{addr}/v1"),
        state,
    }
}

/// A completion body in OpenAI shape.
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "cmpl-1",
        "model": "mock",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14},
    })
    .to_string()
}
