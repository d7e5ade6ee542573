//! Pluggable advisory backend abstraction
//!
//! Turns an analysis payload into free-text budget advice. Exactly one request
//! is made per analysis; any failure is recovered by the orchestrator into
//! deterministic fallback advice, so callers always get text back.
//!
//! # Architecture
//!
//! - `AdvisoryBackend` trait: defines the interface for all backends
//! - `AdvisoryClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OpenAICompatibleBackend`, `MockBackend`
//! - `AdvisoryOrchestrator`: payload -> prompt -> one bounded call -> result
//!
//! # Configuration
//!
//! Environment variables:
//! - `ADVISOR_BACKEND`: gemini, openai_compatible, mock or none. Default: from config
//! - `GEMINI_API_KEY`: required for the gemini backend
//! - `GEMINI_MODEL`, `GEMINI_BASE_URL`: optional overrides
//! - `OPENAI_COMPATIBLE_HOST`: required for the openai_compatible backend
//! - `OPENAI_COMPATIBLE_MODEL`, `OPENAI_COMPATIBLE_API_KEY`: optional
//!
//! Credentials are read here and nowhere else. They are never logged and
//! never placed in the payload.

pub mod fallback;
mod gemini;
mod mock;
mod openai_compatible;
pub mod orchestrator;
pub mod payload;

pub use fallback::fallback_advice;
pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockMode};
pub use openai_compatible::OpenAICompatibleBackend;
pub use orchestrator::{AdvisoryOrchestrator, AdvisoryRun, AdvisoryState, FailureReason};
pub use payload::AdvisoryPayload;

use async_trait::async_trait;

use crate::config::{AdvisorConfig, BackendKind};
use crate::error::Result;
use crate::prompts::RenderedPrompt;

/// Trait defining the interface for all advisory backends
#[async_trait]
pub trait AdvisoryBackend: Send + Sync {
    /// Send one rendered prompt and return the generated text
    ///
    /// An empty string is a valid return; the orchestrator decides what an
    /// empty reply means.
    async fn generate_advice(&self, prompt: &RenderedPrompt) -> Result<String>;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete advisory client enum
#[derive(Clone)]
pub enum AdvisoryClient {
    /// Google Gemini `generateContent` API
    Gemini(GeminiBackend),
    /// Any server implementing `/v1/chat/completions`
    OpenAICompatible(OpenAICompatibleBackend),
    /// Scripted backend for tests
    Mock(MockBackend),
}

impl AdvisoryClient {
    /// Create a client from the config and environment variables
    ///
    /// `ADVISOR_BACKEND` overrides the configured backend. Returns None when
    /// the backend is disabled or its credential is not set; callers then go
    /// straight to fallback advice without any network traffic.
    pub fn from_env(config: &AdvisorConfig) -> Option<Self> {
        let backend = match std::env::var("ADVISOR_BACKEND") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(backend = %value, "Unknown ADVISOR_BACKEND, using configured backend");
                config.backend
            }),
            Err(_) => config.backend,
        };

        match backend {
            BackendKind::Gemini => GeminiBackend::from_env(config).map(AdvisoryClient::Gemini),
            BackendKind::OpenAICompatible => {
                OpenAICompatibleBackend::from_env(config).map(AdvisoryClient::OpenAICompatible)
            }
            BackendKind::Mock => Some(AdvisoryClient::Mock(MockBackend::new())),
            BackendKind::Disabled => None,
        }
    }

    /// Create a mock backend for testing
    pub fn mock(mode: MockMode) -> Self {
        AdvisoryClient::Mock(MockBackend::with_mode(mode))
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            AdvisoryClient::Gemini(_) => BackendKind::Gemini,
            AdvisoryClient::OpenAICompatible(_) => BackendKind::OpenAICompatible,
            AdvisoryClient::Mock(_) => BackendKind::Mock,
        }
    }
}

/// Model name from an environment override, then config, then the backend default
///
/// Blank values at either level are skipped.
pub(crate) fn resolve_model(env_model: Option<String>, configured: &str, default: &str) -> String {
    env_model
        .filter(|m| !m.trim().is_empty())
        .or_else(|| (!configured.trim().is_empty()).then(|| configured.to_string()))
        .unwrap_or_else(|| default.to_string())
}

// Implement AdvisoryBackend for AdvisoryClient by delegating to the inner backend
#[async_trait]
impl AdvisoryBackend for AdvisoryClient {
    async fn generate_advice(&self, prompt: &RenderedPrompt) -> Result<String> {
        match self {
            AdvisoryClient::Gemini(b) => b.generate_advice(prompt).await,
            AdvisoryClient::OpenAICompatible(b) => b.generate_advice(prompt).await,
            AdvisoryClient::Mock(b) => b.generate_advice(prompt).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AdvisoryClient::Gemini(b) => b.model(),
            AdvisoryClient::OpenAICompatible(b) => b.model(),
            AdvisoryClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AdvisoryClient::Gemini(b) => b.host(),
            AdvisoryClient::OpenAICompatible(b) => b.host(),
            AdvisoryClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_delegates_to_mock() {
        let client = AdvisoryClient::mock(MockMode::Reply("Save more.".into()));
        let prompt = RenderedPrompt {
            system: None,
            user: "payload".into(),
        };
        assert_eq!(client.generate_advice(&prompt).await.unwrap(), "Save more.");
        assert_eq!(client.model(), "mock");
        assert_eq!(client.kind(), BackendKind::Mock);
    }

    #[test]
    fn test_resolve_model_precedence() {
        assert_eq!(
            resolve_model(Some("llama3.2".into()), "gemini-2.5-flash", "gpt-3.5-turbo"),
            "llama3.2"
        );
        assert_eq!(resolve_model(None, "mistral", "gpt-3.5-turbo"), "mistral");
        assert_eq!(resolve_model(Some(" ".into()), "mistral", "gpt-3.5-turbo"), "mistral");
        assert_eq!(resolve_model(None, "", "gpt-3.5-turbo"), "gpt-3.5-turbo");
    }

    #[test]
    fn test_disabled_backend_has_no_client() {
        // Only meaningful when ADVISOR_BACKEND is not forcing another backend
        if std::env::var("ADVISOR_BACKEND").is_err() {
            let config = AdvisorConfig::default().with_backend(BackendKind::Disabled);
            assert!(AdvisoryClient::from_env(&config).is_none());
        }
    }
}
