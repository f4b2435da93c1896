//! Test utilities for snapledger-core
//!
//! Provides a mock Gemini server speaking the generateContent wire format,
//! used for backend integration tests without a real API key. Scripted
//! markers in the receipt text steer the response:
//!
//! - `NOJSON`: reply with prose that contains no JSON object
//! - `BADCATEGORY`: reply with a category outside the schema enum
//! - a few-shot fixture receipt: reply with the fixture response wrapped
//!   in commentary (exercises the brace scan)

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::prompts::FEW_SHOT_EXAMPLES;

/// Mock Gemini server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1beta/models", get(handle_list_models))
            .route("/v1beta/models/:model_call", post(handle_generate));

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
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Models listing endpoint (health check)
async fn handle_list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: vec![ModelInfo {
            name: "models/gemini-2.0-flash".to_string(),
        }],
    })
}

/// generateContent endpoint
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    // The last content turn carries the delimited receipt text
    let user_text = request
        .contents
        .last()
        .and_then(|c| c.parts.first())
        .map(|p| p.text.as_str())
        .unwrap_or_default();
    let receipt = extract_receipt_text(user_text);

    let response = if receipt.contains("NOJSON") {
        "I was unable to read that receipt, sorry.".to_string()
    } else if receipt.contains("BADCATEGORY") {
        r#"{"date": null, "type": "out", "category": "snacks", "sub_category": null, "amount": 1.00, "note": null}"#.to_string()
    } else if let Some(example) = FEW_SHOT_EXAMPLES.iter().find(|e| e.receipt == receipt) {
        // Wrap in commentary so the client must locate the JSON
        format!("Here is the structured record:\n{}\nDone.", example.response)
    } else {
        r#"{"date": "2025-01-15", "type": "out", "category": "other", "sub_category": "mock merchant", "amount": 12.34, "note": null}"#.to_string()
    };

    Json(GenerateResponse {
        candidates: vec![Candidate {
            content: Content {
                role: "model".to_string(),
                parts: vec![Part { text: response }],
            },
        }],
    })
}

/// Undo the user-turn delimiting applied by the prompt builder
fn extract_receipt_text(turn: &str) -> &str {
    turn.split("<<<\n")
        .nth(1)
        .and_then(|rest| rest.split("\n>>>").next())
        .unwrap_or(turn)
}

// Request/Response types for the mock server

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[allow(dead_code)]
    #[serde(rename = "system_instruction")]
    system_instruction: Option<serde_json::Value>,
    #[serde(default)]
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    #[allow(dead_code)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GenerativeBackend, GeminiBackend};
    use crate::models::{Category, Flow};

    fn client_for(server: &MockGeminiServer) -> GeminiBackend {
        GeminiBackend::new(&server.url(), "gemini-2.0-flash", "test-key")
    }

    #[tokio::test]
    async fn mock_server_health_check() {
        let server = MockGeminiServer::start().await;
        let client = client_for(&server);
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn mock_server_replays_fixture_with_commentary() {
        let server = MockGeminiServer::start().await;
        let client = crate::ai::GenerativeClient::Gemini(client_for(&server));

        let record = client
            .structure_receipt(FEW_SHOT_EXAMPLES[0].receipt)
            .await
            .unwrap();
        assert_eq!(record.flow, Flow::Out);
        assert_eq!(record.category, Category::Dining);
        assert_eq!(record.amount, 8.75);
    }

    #[tokio::test]
    async fn mock_server_nojson_marker_fails_extraction() {
        let server = MockGeminiServer::start().await;
        let client = crate::ai::GenerativeClient::Gemini(client_for(&server));

        let err = client
            .structure_receipt("NOJSON receipt body")
            .await
            .unwrap_err();
        assert!(err.triggers_fallback());
    }

    #[tokio::test]
    async fn mock_server_bad_category_fails_validation() {
        let server = MockGeminiServer::start().await;
        let client = crate::ai::GenerativeClient::Gemini(client_for(&server));

        let err = client
            .structure_receipt("BADCATEGORY receipt body")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("'category'"));
    }

    #[tokio::test]
    async fn extract_receipt_text_unwraps_delimiters() {
        let turn = crate::prompts::user_turn("STORE\nTotal $5.00");
        assert_eq!(extract_receipt_text(&turn), "STORE\nTotal $5.00");
    }
}
