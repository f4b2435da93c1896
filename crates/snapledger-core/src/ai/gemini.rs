//! Gemini backend implementation
//!
//! HTTP client for the generative-language API. One request/response
//! generation call: role-tagged content turns plus sampling parameters in,
//! generated text out. The response text is treated as untrusted free text;
//! all parsing and validation happens in [`super::parsing`].
//!
//! # Configuration
//!
//! Environment variables:
//! - `GEMINI_API_KEY`: API key (required)
//! - `GEMINI_MODEL`: Model name (default: gemini-2.0-flash)
//! - `GEMINI_HOST`: API base URL (default: https://generativelanguage.googleapis.com)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::{ContentTurn, GenerationParams};
use super::GenerativeBackend;

const DEFAULT_HOST: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini generative-language backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create from environment variables. Returns None without an API key.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let host = std::env::var("GEMINI_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        Some(Self::new(&host, &model, &api_key))
    }

    /// Create a new instance with a different model (same host and key)
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(rename = "system_instruction")]
    system_instruction: WireContent,
    contents: Vec<WireContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<WireContent>,
}

impl WireContent {
    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![WirePart {
                text: text.to_string(),
            }],
        }
    }

    fn from_turn(turn: &ContentTurn) -> Self {
        Self {
            role: Some(turn.role.as_str().to_string()),
            parts: vec![WirePart {
                text: turn.text.clone(),
            }],
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(
        &self,
        system_instruction: &str,
        turns: &[ContentTurn],
        params: GenerationParams,
    ) -> Result<String> {
        let request = GenerateRequest {
            system_instruction: WireContent::system(system_instruction),
            contents: turns.iter().map(WireContent::from_turn).collect(),
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        };

        debug!(
            model = %self.model,
            turns = turns.len(),
            temperature = params.temperature,
            "Sending generateContent request"
        );

        let response = self
            .http_client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let generate_response: GenerateResponse = response.json().await?;

        let text = generate_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Extraction("No text in AI response".into()))?;

        debug!(chars = text.len(), "Received generateContent response");

        Ok(text)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/v1beta/models", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::TurnRole;

    #[test]
    fn backend_new_trims_trailing_slash() {
        let backend = GeminiBackend::new("https://example.test/", "gemini-2.0-flash", "k");
        assert_eq!(backend.host(), "https://example.test");
        assert_eq!(backend.model(), "gemini-2.0-flash");
    }

    #[test]
    fn from_env_missing_key_is_none() {
        std::env::remove_var("GEMINI_API_KEY");
        assert!(GeminiBackend::from_env().is_none());
    }

    #[test]
    fn with_model_keeps_host() {
        let backend = GeminiBackend::new("https://example.test", "gemini-2.0-flash", "k");
        let other = backend.with_model("gemini-2.5-pro");
        assert_eq!(other.model(), "gemini-2.5-pro");
        assert_eq!(other.host(), backend.host());
    }

    #[test]
    fn request_serialization_shape() {
        let request = GenerateRequest {
            system_instruction: WireContent::system("be terse"),
            contents: vec![WireContent::from_turn(&ContentTurn {
                role: TurnRole::User,
                text: "hello".into(),
            })],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 1024,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system_instruction"]["parts"][0]["text"], "be terse");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        // System instruction carries no role tag
        assert!(json["system_instruction"].get("role").is_none());
    }

    #[test]
    fn response_deserialization_joins_parts() {
        let raw = r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "a"}, {"text": "b"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: Vec<String> = response.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .map(|p| p.text.clone())
            .collect();
        assert_eq!(text.join("\n"), "a\nb");
    }
}
