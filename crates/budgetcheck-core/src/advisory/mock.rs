//! Mock backend for testing
//!
//! Scripted responses for the advisory flow, without any server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::prompts::RenderedPrompt;

use super::AdvisoryBackend;

const DEFAULT_REPLY: &str = "1. Review your largest wants categories.\n\
2. Automate a savings transfer on payday.\n\
3. Keep needs close to 50% of income.";

/// How the mock answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockMode {
    /// Return this text
    Reply(String),
    /// Return an empty string
    Empty,
    /// Return a backend error
    Fail,
    /// Wait this long, then reply with the default text
    Delay(Duration),
    /// Never answer
    Hang,
}

/// Mock advisory backend for testing
#[derive(Clone)]
pub struct MockBackend {
    mode: MockMode,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a mock that replies with fixed advice
    pub fn new() -> Self {
        Self::with_mode(MockMode::Reply(DEFAULT_REPLY.to_string()))
    }

    pub fn with_mode(mode: MockMode) -> Self {
        Self {
            mode,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of requests received (shared between clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvisoryBackend for MockBackend {
    async fn generate_advice(&self, _prompt: &RenderedPrompt) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            MockMode::Reply(text) => Ok(text.clone()),
            MockMode::Empty => Ok(String::new()),
            MockMode::Fail => Err(Error::Advisory("mock backend failure".into())),
            MockMode::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(DEFAULT_REPLY.to_string())
            }
            MockMode::Hang => std::future::pending().await,
        }
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
