//! Test utilities for budgetcheck-core
//!
//! This module provides a mock advisory server that speaks both the Gemini
//! `generateContent` and the OpenAI chat completions wire formats, so the
//! real HTTP backends can be exercised without network access.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Advice returned by the mock server unless told otherwise
pub const MOCK_ADVICE: &str = "1. Move 5% of income from wants to savings.\n\
2. Set up an automatic transfer on payday.\n\
3. Review your largest discretionary category monthly.";

/// How the mock server answers
#[derive(Debug, Clone)]
pub enum MockServerMode {
    /// Answer with this text
    Reply(String),
    /// Answer successfully with no text
    Empty,
    /// Answer with this HTTP status and no usable body
    Status(u16),
    /// Wait, then answer with [`MOCK_ADVICE`]
    Delay(Duration),
}

struct ServerState {
    mode: MockServerMode,
    requests: AtomicUsize,
    last_api_key: Mutex<Option<String>>,
    last_body: Mutex<Option<Value>>,
}

/// Mock advisory server for testing
pub struct MockAdvisorServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAdvisorServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with_mode(MockServerMode::Reply(MOCK_ADVICE.to_string())).await
    }

    pub async fn start_with_mode(mode: MockServerMode) -> Self {
        let state = Arc::new(ServerState {
            mode,
            requests: AtomicUsize::new(0),
            last_api_key: Mutex::new(None),
            last_body: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1beta/models/:model", post(handle_generate_content))
            .route("/v1/chat/completions", post(handle_chat_completions))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received so far
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// API key sent with the last request, from either auth header
    pub fn last_api_key(&self) -> Option<String> {
        self.state.last_api_key.lock().unwrap().clone()
    }

    /// JSON body of the last request
    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAdvisorServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Record the request and decide the reply text, or an error status
async fn answer(
    state: &ServerState,
    headers: &HeaderMap,
    body: Value,
) -> std::result::Result<String, StatusCode> {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::to_string)
        });
    *state.last_api_key.lock().unwrap() = api_key;
    *state.last_body.lock().unwrap() = Some(body);

    match &state.mode {
        MockServerMode::Reply(text) => Ok(text.clone()),
        MockServerMode::Empty => Ok(String::new()),
        MockServerMode::Status(code) => {
            Err(StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        }
        MockServerMode::Delay(delay) => {
            tokio::time::sleep(*delay).await;
            Ok(MOCK_ADVICE.to_string())
        }
    }
}

/// Gemini endpoint: `POST /v1beta/models/{model}:generateContent`
async fn handle_generate_content(
    State(state): State<Arc<ServerState>>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !target.ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }

    match answer(&state, &headers, body).await {
        Ok(text) if text.is_empty() => Json(json!({
            "candidates": [{"content": {"role": "model", "parts": []}, "finishReason": "STOP"}]
        }))
        .into_response(),
        Ok(text) => Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        Err(status) => (status, Json(json!({"error": {"code": status.as_u16()}}))).into_response(),
    }
}

/// OpenAI endpoint: `POST /v1/chat/completions`
async fn handle_chat_completions(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let model = body["model"].as_str().unwrap_or("mock").to_string();

    match answer(&state, &headers, body).await {
        Ok(text) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Err(status) => (status, Json(json!({"error": {"message": "mock error"}}))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::{
        AdvisoryBackend, AdvisoryClient, AdvisoryOrchestrator, AdvisoryPayload, GeminiBackend,
        OpenAICompatibleBackend,
    };
    use crate::models::{AdvisorySource, BudgetBreakdown};
    use crate::prompts::{PromptId, PromptLibrary, RenderedPrompt};
    use crate::score::compute_health_score;
    use rust_decimal::Decimal;

    fn prompt() -> RenderedPrompt {
        RenderedPrompt {
            system: Some("You are a budgeting advisor.".into()),
            user: "PAYLOAD: {}".into(),
        }
    }

    #[tokio::test]
    async fn test_gemini_round_trip() {
        let server = MockAdvisorServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", "test-key");

        let text = backend.generate_advice(&prompt()).await.unwrap();
        assert_eq!(text, MOCK_ADVICE);
        assert_eq!(server.requests(), 1);
        assert_eq!(server.last_api_key().as_deref(), Some("test-key"));

        let body = server.last_body().unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "PAYLOAD: {}");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a budgeting advisor."
        );
    }

    #[tokio::test]
    async fn test_gemini_error_status() {
        let server = MockAdvisorServer::start_with_mode(MockServerMode::Status(429)).await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", "test-key");

        let err = backend.generate_advice(&prompt()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(!message.contains("test-key"));
    }

    #[tokio::test]
    async fn test_gemini_empty_reply() {
        let server = MockAdvisorServer::start_with_mode(MockServerMode::Empty).await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", "k");
        assert_eq!(backend.generate_advice(&prompt()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_openai_round_trip_with_bearer() {
        let server =
            MockAdvisorServer::start_with_mode(MockServerMode::Reply("Save more.".into())).await;
        let backend = OpenAICompatibleBackend::with_api_key(&server.url(), "llama3.2", "sk-test");

        let text = backend.generate_advice(&prompt()).await.unwrap();
        assert_eq!(text, "Save more.");
        assert_eq!(server.last_api_key().as_deref(), Some("sk-test"));
        assert_eq!(server.last_body().unwrap()["messages"][0]["role"], "system");
    }

    #[tokio::test]
    async fn test_openai_error_status() {
        let server = MockAdvisorServer::start_with_mode(MockServerMode::Status(500)).await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "llama3.2");
        assert!(backend.generate_advice(&prompt()).await.is_err());
        assert!(server.last_api_key().is_none());
    }

    #[tokio::test]
    async fn test_slow_server_times_out_to_fallback() {
        let server =
            MockAdvisorServer::start_with_mode(MockServerMode::Delay(Duration::from_secs(2))).await;
        let client = AdvisoryClient::Gemini(GeminiBackend::new(
            &server.url(),
            "gemini-2.5-flash",
            "test-key",
        ));
        let prompt = PromptLibrary::embedded_only()
            .get(PromptId::BudgetAdvice)
            .unwrap()
            .clone();
        let orchestrator =
            AdvisoryOrchestrator::with_prompt(Some(client), prompt, Duration::from_millis(200));

        let breakdown = BudgetBreakdown {
            needs_total: Decimal::from(1000),
            wants_total: Decimal::from(700),
            savings_total: Decimal::from(300),
            top_discretionary: vec![("eating out".into(), Decimal::from(700))],
        };
        let health = compute_health_score(2000.0, 1000.0, 700.0, 300.0);
        let payload = AdvisoryPayload::build(Decimal::from(2000), "£", &breakdown, &health);

        let run = orchestrator.advise(&payload, &health).await;
        assert!(run.timed_out());
        assert_eq!(run.result.source, AdvisorySource::Fallback);
        assert_eq!(run.result.score, health.score);
        assert!(!run.result.advice.contains(MOCK_ADVICE));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut server = MockAdvisorServer::start().await;
        server.stop();
        server.stop();
    }
}
