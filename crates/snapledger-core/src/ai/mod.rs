//! Pluggable generative AI backend abstraction
//!
//! The AI structuring extractor talks to a generative-language backend
//! through a minimal boundary: one request/response generation call taking
//! role-tagged text turns and sampling parameters, returning generated
//! text. The returned text is untrusted; parsing and schema validation
//! live entirely on this side of the boundary.
//!
//! # Architecture
//!
//! - `GenerativeBackend` trait: the generation call interface
//! - `GenerativeClient` enum: concrete wrapper providing Clone +
//!   compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for the gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-2.0-flash)
//! - `GEMINI_HOST`: API base URL override (used by tests)

mod gemini;
mod mock;
pub mod parsing;
pub mod types;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use types::{ContentTurn, GenerationParams, TurnRole};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::StructuredRecord;
use crate::prompts::{user_turn, FEW_SHOT_EXAMPLES, SYSTEM_INSTRUCTION};

/// Trait defining the generation call interface for all AI backends
///
/// Backends are transport only; they must not interpret the generated text.
/// Send + Sync so clients can be shared across async tasks.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Run a single generation request and return the raw response text
    async fn generate(
        &self,
        system_instruction: &str,
        turns: &[ContentTurn],
        params: GenerationParams,
    ) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for diagnostics)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum GenerativeClient {
    /// Gemini backend (generative-language HTTP API)
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl GenerativeClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `gemini` (default): requires GEMINI_API_KEY
    /// - `mock`: fixture-replaying backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" => GeminiBackend::from_env().map(GenerativeClient::Gemini),
            "mock" => Some(GenerativeClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(GenerativeClient::Gemini)
            }
        }
    }

    /// Create a Gemini backend directly
    pub fn gemini(host: &str, model: &str, api_key: &str) -> Self {
        GenerativeClient::Gemini(GeminiBackend::new(host, model, api_key))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        GenerativeClient::Mock(MockBackend::new())
    }

    /// Structure raw OCR text into a validated record.
    ///
    /// Builds the fixed prompt (system instruction, few-shot turns, the
    /// delimited user turn), runs one generation call with low-temperature
    /// sampling, then parses and validates the response. Any backend
    /// failure, malformed response or schema violation is an error; the
    /// orchestrator decides what to do with it.
    pub async fn structure_receipt(&self, ocr_text: &str) -> Result<StructuredRecord> {
        let turns = build_conversation(ocr_text);
        let response = self
            .generate(SYSTEM_INSTRUCTION, &turns, GenerationParams::default())
            .await?;
        parsing::parse_structured_record(&response)
    }
}

/// Few-shot demonstration turns plus the caller's delimited user turn
fn build_conversation(ocr_text: &str) -> Vec<ContentTurn> {
    let mut turns = Vec::with_capacity(FEW_SHOT_EXAMPLES.len() * 2 + 1);
    for example in FEW_SHOT_EXAMPLES {
        turns.push(ContentTurn::user(user_turn(example.receipt)));
        turns.push(ContentTurn::model(example.response));
    }
    turns.push(ContentTurn::user(user_turn(ocr_text)));
    turns
}

// Implement GenerativeBackend for GenerativeClient by delegating to the inner backend
#[async_trait]
impl GenerativeBackend for GenerativeClient {
    async fn generate(
        &self,
        system_instruction: &str,
        turns: &[ContentTurn],
        params: GenerationParams,
    ) -> Result<String> {
        match self {
            GenerativeClient::Gemini(b) => b.generate(system_instruction, turns, params).await,
            GenerativeClient::Mock(b) => b.generate(system_instruction, turns, params).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            GenerativeClient::Gemini(b) => b.health_check().await,
            GenerativeClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            GenerativeClient::Gemini(b) => b.model(),
            GenerativeClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            GenerativeClient::Gemini(b) => b.host(),
            GenerativeClient::Mock(b) => b.host(),
        }
    }
}
