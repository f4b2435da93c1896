//! Transaction read handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::{AppError, AppState, DEFAULT_USER, MAX_PAGE_LIMIT};
use snapledger_core::models::Transaction;

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/transactions - List a user's transactions, most recent first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let user = params.user.unwrap_or_else(|| DEFAULT_USER.to_string());
    let limit = params.limit.unwrap_or(50).clamp(1, MAX_PAGE_LIMIT);

    let transactions = state.db.list_transactions(&user, limit)?;
    Ok(Json(transactions))
}

/// GET /api/transactions/:id - Get a specific transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    Ok(Json(transaction))
}
