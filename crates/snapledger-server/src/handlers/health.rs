//! Health handler

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::{AppError, AppState};
use snapledger_core::GenerativeBackend;

/// Response for GET /api/health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub database: bool,
    /// None when no AI backend is configured (rule-based extraction only)
    pub ai_backend: Option<bool>,
    pub transactions: i64,
}

/// GET /api/health - Database and AI backend reachability
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, AppError> {
    let database = state.db.health_check();
    let ai_backend = match state.pipeline.client() {
        Some(client) => Some(client.health_check().await),
        None => None,
    };
    let transactions = state.db.transaction_count()?;

    Ok(Json(HealthResponse {
        database,
        ai_backend,
        transactions,
    }))
}
