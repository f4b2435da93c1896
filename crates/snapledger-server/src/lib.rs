//! snapledger Web Server
//!
//! Axum-based REST shim around the extraction pipeline. The server owns no
//! extraction logic: it validates input, invokes the pipeline, persists the
//! canonical record, and reports provenance back to the caller.
//!
//! Endpoints:
//! - `POST /api/extract`: resolve raw OCR text into a transaction
//! - `GET  /api/transactions`: list a user's stored transactions
//! - `GET  /api/transactions/:id`: fetch one stored transaction
//! - `GET  /api/health`: database and AI backend reachability

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use snapledger_core::db::Database;
use snapledger_core::{ExtractionPipeline, GenerativeBackend, GenerativeClient};

mod handlers;


/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// User identifier assumed when a request carries none.
///
/// Authentication is an outer concern; a deployment fronting this shim
/// with an auth proxy supplies real user identifiers per request.
pub const DEFAULT_USER: &str = "local";

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub pipeline: ExtractionPipeline,
}

/// Create the application router
pub fn create_router(db: Database, client: Option<GenerativeClient>) -> Router {
    match &client {
        Some(c) => info!(
            host = c.host(),
            model = c.model(),
            "AI backend configured"
        ),
        None => info!("AI backend not configured (set GEMINI_API_KEY to enable the AI path)"),
    }

    let state = Arc::new(AppState {
        db,
        pipeline: ExtractionPipeline::new(client),
    });

    let api_routes = Router::new()
        .route("/extract", post(handlers::extract))
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions/:id", get(handlers::get_transaction))
        .route("/health", get(handlers::health))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the server until the listener fails
pub async fn serve(router: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "snapledger server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
