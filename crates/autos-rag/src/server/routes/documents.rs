//! Read endpoints over persisted documents and the token ledger

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::document::Document;
use crate::types::llm::TokenUsage;

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub pje_id: String,
    pub natureza: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// GET /api/contexts/:id/documents - newest-first document summaries
pub async fn list_documents(
    State(state): State<AppState>,
    Path(context_id): Path<i64>,
) -> Result<Json<Vec<DocumentSummary>>> {
    let documents = state.store().list_documents(context_id)?;
    Ok(Json(
        documents
            .into_iter()
            .map(|d| DocumentSummary {
                id: d.id,
                pje_id: d.pje_id,
                natureza: d.natureza,
                created_at: d.created_at,
            })
            .collect(),
    ))
}

/// GET /api/documents/:id - one full document
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>> {
    let document = state
        .store()
        .get_document(&id)?
        .ok_or_else(|| Error::not_found(format!("document {}", id)))?;
    Ok(Json(document))
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub context_id: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

/// GET /api/contexts/:id/usage - token ledger totals
pub async fn token_usage(
    State(state): State<AppState>,
    Path(context_id): Path<i64>,
) -> Result<Json<UsageResponse>> {
    let usage: TokenUsage = state.store().get_token_usage(context_id)?;
    Ok(Json(UsageResponse {
        context_id,
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens(),
    }))
}
