//! Semantic search over embedded documents

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::providers::embedding_index::SearchFilter;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub context_id: i64,
    pub text: String,
    /// Restrict hits to one natureza key
    #[serde(default)]
    pub natureza: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub document_id: String,
    pub pje_id: String,
    pub natureza: i32,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
}

/// POST /api/search - nearest embedded documents to a query text.
///
/// The query embedding is charged to the context's token ledger like any
/// other call.
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    if request.text.trim().is_empty() {
        return Err(Error::Config("text must not be empty".to_string()));
    }

    let embedding = state.llm().embed(&request.text).await?;
    state
        .store()
        .add_token_usage(request.context_id, embedding.usage)?;

    let hits = state
        .embeddings()
        .semantic_search(
            &embedding.vector,
            SearchFilter {
                context_id: Some(request.context_id),
                natureza: request.natureza,
            },
            request.limit.clamp(1, 50),
        )
        .await?;

    Ok(Json(SearchResponse {
        hits: hits
            .into_iter()
            .map(|hit| SearchHit {
                document_id: hit.record.document_id,
                pje_id: hit.record.pje_id,
                natureza: hit.record.natureza,
                score: hit.score,
            })
            .collect(),
    }))
}
