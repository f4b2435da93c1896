//! Extraction handler

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, DEFAULT_USER};
use snapledger_core::models::{CanonicalTransaction, Provenance};
use snapledger_core::{content_hash, Error, NewTransaction};

/// Request body for POST /api/extract
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Raw OCR text for one capture
    pub text: String,
    /// Owning user; defaults to the local single-user identity
    pub user_id: Option<String>,
    /// Persist the canonical record (default: true)
    pub save: Option<bool>,
}

/// Response for POST /api/extract
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub transaction: CanonicalTransaction,
    pub provenance: Provenance,
    /// The fallback path produced its documented defaults
    pub degraded: bool,
    /// Persisted row id, when saving was requested
    pub id: Option<i64>,
    /// The same capture was already stored for this user
    pub duplicate: bool,
}

/// POST /api/extract - Resolve raw OCR text into a canonical transaction
pub async fn extract(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let user_id = request
        .user_id
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER.to_string());

    let outcome = match state.pipeline.extract(&request.text).await {
        Ok(outcome) => outcome,
        Err(Error::EmptyInput) => {
            return Err(AppError::bad_request("No text to extract from"));
        }
        Err(err) => return Err(err.into()),
    };

    let mut id = None;
    let mut duplicate = false;
    if request.save.unwrap_or(true) {
        let hash = content_hash(&user_id, request.text.trim());
        let new_tx = NewTransaction::from_outcome(&outcome, Some(hash));
        let result = state.db.insert_transaction(&user_id, &new_tx)?;
        duplicate = result.is_duplicate();
        id = Some(result.id());
    }

    info!(
        user = %user_id,
        provenance = %outcome.provenance,
        degraded = outcome.degraded,
        duplicate,
        "Extraction completed"
    );

    Ok(Json(ExtractResponse {
        transaction: outcome.transaction,
        provenance: outcome.provenance,
        degraded: outcome.degraded,
        id,
        duplicate,
    }))
}
