//! Backend-agnostic request types for the generative AI boundary
//!
//! The backend contract is a single request/response generation call: a
//! list of role-tagged text turns plus sampling parameters in, generated
//! text out. Everything else (prompt construction, response parsing,
//! validation) is the core's responsibility.

use serde::{Deserialize, Serialize};

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One role-tagged text turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ContentTurn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Create a model turn
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Sampling parameters for a generation request
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    /// Low temperature favors deterministic extraction
    pub temperature: f32,
    /// Output token budget; a structured record is small
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_constructors_set_roles() {
        assert_eq!(ContentTurn::user("hi").role, TurnRole::User);
        assert_eq!(ContentTurn::model("ok").role, TurnRole::Model);
        assert_eq!(TurnRole::Model.as_str(), "model");
    }

    #[test]
    fn default_params_favor_determinism() {
        let params = GenerationParams::default();
        assert!(params.temperature <= 0.2);
        assert!(params.max_output_tokens >= 256);
    }
}
