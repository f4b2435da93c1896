//! Mock backend for testing
//!
//! Replays the canonical few-shot examples: when the user turn wraps one of
//! the fixture receipts, the fixture response comes back verbatim, which
//! makes round-trip tests against the prompt fixtures meaningful. Responses
//! can also be scripted for failure-path tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::prompts::{user_turn, FEW_SHOT_EXAMPLES};

use super::types::{ContentTurn, GenerationParams, TurnRole};
use super::GenerativeBackend;

/// Response returned when no fixture matches and nothing is scripted
const DEFAULT_RESPONSE: &str = r#"{"date": "2025-01-15", "type": "out", "category": "other", "sub_category": "mock merchant", "amount": 12.34, "note": null}"#;

/// Mock generative backend
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    healthy: bool,
    /// Fixed response overriding the fixture lookup
    scripted: Option<String>,
    /// Artificial latency before responding
    delay: Option<Duration>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            scripted: None,
            delay: None,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Script a fixed response for every generate call
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            scripted: Some(response.into()),
            ..Self::new()
        }
    }

    /// Add artificial latency (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(
        &self,
        _system_instruction: &str,
        turns: &[ContentTurn],
        _params: GenerationParams,
    ) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(scripted) = &self.scripted {
            return Ok(scripted.clone());
        }

        // The last user turn carries the delimited receipt text
        let last_user = turns
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::User)
            .map(|t| t.text.as_str())
            .unwrap_or_default();

        for example in FEW_SHOT_EXAMPLES {
            if last_user == user_turn(example.receipt) {
                return Ok(example.response.to_string());
            }
        }

        Ok(DEFAULT_RESPONSE.to_string())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
