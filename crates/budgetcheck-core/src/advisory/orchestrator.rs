//! Advisory orchestration
//!
//! One run walks an explicit state machine:
//!
//! ```text
//! Idle -> PayloadBuilt -> Requesting -> Succeeded ----> Resolved(Generated)
//!                      |             -> TimedOut  --+
//!                      |             -> Failed    --+-> Resolved(Fallback)
//!                      +-> Failed(CredentialMissing) -+
//! ```
//!
//! At most one request is made, bounded by the configured timeout, with no
//! retry. Every path ends in `Resolved` with advice text. Dropping the future
//! returned by [`AdvisoryOrchestrator::advise`] abandons any in-flight request.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AdvisorConfig;
use crate::error::Result;
use crate::models::{AdvisoryResult, AdvisorySource, HealthScore};
use crate::prompts::{Prompt, PromptId, PromptLibrary};

use super::fallback::fallback_advice;
use super::payload::AdvisoryPayload;
use super::{AdvisoryBackend, AdvisoryClient};

/// Why generated advice was not used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// No backend credential configured; nothing was sent
    CredentialMissing,
    /// The payload could not be serialized
    Payload(String),
    /// The backend returned an error
    Backend(String),
    /// The backend answered with blank text
    EmptyResponse,
}

impl FailureReason {
    /// Short label for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialMissing => "credential_missing",
            Self::Payload(_) => "payload",
            Self::Backend(_) => "backend",
            Self::EmptyResponse => "empty_response",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Payload(msg) | Self::Backend(msg) => write!(f, "{}: {}", self.as_str(), msg),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

/// Orchestrator states, in the order a run passes through them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryState {
    Idle,
    PayloadBuilt,
    Requesting,
    Succeeded,
    TimedOut,
    Failed(FailureReason),
    Resolved(AdvisorySource),
}

impl std::fmt::Display for AdvisoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::PayloadBuilt => write!(f, "payload_built"),
            Self::Requesting => write!(f, "requesting"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::Failed(reason) => write!(f, "failed({})", reason.as_str()),
            Self::Resolved(source) => write!(f, "resolved({})", source),
        }
    }
}

/// Outcome of one advisory run plus the states it went through
#[derive(Debug, Clone)]
pub struct AdvisoryRun {
    pub result: AdvisoryResult,
    pub trace: Vec<AdvisoryState>,
}

impl AdvisoryRun {
    /// The failure that caused a fallback, if any
    pub fn failure(&self) -> Option<&FailureReason> {
        self.trace.iter().find_map(|state| match state {
            AdvisoryState::Failed(reason) => Some(reason),
            _ => None,
        })
    }

    pub fn timed_out(&self) -> bool {
        self.trace.contains(&AdvisoryState::TimedOut)
    }
}

/// Records transitions as they happen
struct Transitions {
    trace: Vec<AdvisoryState>,
}

impl Transitions {
    fn new() -> Self {
        let mut t = Self { trace: Vec::new() };
        t.enter(AdvisoryState::Idle);
        t
    }

    fn enter(&mut self, state: AdvisoryState) {
        debug!(state = %state, "Advisory state");
        self.trace.push(state);
    }
}

/// Builds the prompt, makes the single bounded call, and picks the advice
pub struct AdvisoryOrchestrator {
    client: Option<AdvisoryClient>,
    prompt: Prompt,
    timeout: Duration,
}

impl AdvisoryOrchestrator {
    /// Create with the prompt library's `budget_advice` prompt
    pub fn new(client: Option<AdvisoryClient>, config: &AdvisorConfig) -> Result<Self> {
        let mut prompts = PromptLibrary::new();
        let prompt = prompts.get(PromptId::BudgetAdvice)?.clone();
        Ok(Self::with_prompt(client, prompt, config.timeout))
    }

    /// Create from config, choosing the backend from the environment
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        Self::new(AdvisoryClient::from_env(config), config)
    }

    pub fn with_prompt(client: Option<AdvisoryClient>, prompt: Prompt, timeout: Duration) -> Self {
        Self {
            client,
            prompt,
            timeout,
        }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Produce advice for a payload
    ///
    /// Never fails: every error path ends in fallback advice. The returned
    /// score is always the health score passed in.
    pub async fn advise(&self, payload: &AdvisoryPayload, health: &HealthScore) -> AdvisoryRun {
        let mut transitions = Transitions::new();

        let outcome = self.request(payload, &mut transitions).await;

        let (advice, source) = match outcome {
            Some(text) => (text, AdvisorySource::Generated),
            None => (fallback_advice(payload), AdvisorySource::Fallback),
        };
        transitions.enter(AdvisoryState::Resolved(source));

        AdvisoryRun {
            result: AdvisoryResult {
                score: health.score,
                advice,
                source,
            },
            trace: transitions.trace,
        }
    }

    /// Generated text, or None after recording why there is none
    async fn request(
        &self,
        payload: &AdvisoryPayload,
        transitions: &mut Transitions,
    ) -> Option<String> {
        let json = match payload.canonical_json() {
            Ok(json) => json,
            Err(e) => {
                return fail(transitions, FailureReason::Payload(e.to_string()));
            }
        };
        transitions.enter(AdvisoryState::PayloadBuilt);

        let Some(client) = self.client.as_ref() else {
            return fail(transitions, FailureReason::CredentialMissing);
        };

        let mut vars = HashMap::new();
        vars.insert("payload", json.as_str());
        vars.insert("currency", payload.currency.as_str());
        let rendered = self.prompt.render(&vars);

        transitions.enter(AdvisoryState::Requesting);
        debug!(
            model = client.model(),
            host = client.host(),
            timeout_ms = self.timeout.as_millis() as u64,
            "Requesting advice"
        );

        match tokio::time::timeout(self.timeout, client.generate_advice(&rendered)).await {
            Err(_) => {
                transitions.enter(AdvisoryState::TimedOut);
                warn!(
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Advisory request timed out, using fallback advice"
                );
                None
            }
            Ok(Err(e)) => fail(transitions, FailureReason::Backend(e.to_string())),
            Ok(Ok(text)) if text.trim().is_empty() => {
                fail(transitions, FailureReason::EmptyResponse)
            }
            Ok(Ok(text)) => {
                transitions.enter(AdvisoryState::Succeeded);
                info!(model = client.model(), "Generated advice received");
                Some(text.trim().to_string())
            }
        }
    }
}

fn fail(transitions: &mut Transitions, reason: FailureReason) -> Option<String> {
    match reason {
        FailureReason::CredentialMissing => {
            info!("No advisory backend configured, using fallback advice")
        }
        ref other => warn!(reason = %other, "Advisory request failed, using fallback advice"),
    }
    transitions.enter(AdvisoryState::Failed(reason));
    None
}
