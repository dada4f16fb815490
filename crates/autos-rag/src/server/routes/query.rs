//! Question-answering endpoint

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::rag::RagAnswer;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub context_id: i64,
    pub question: String,
}

/// POST /api/query - answer a question over the context's documents
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<RagAnswer>> {
    if request.question.trim().is_empty() {
        return Err(Error::Config("question must not be empty".to_string()));
    }

    let answer = state
        .rag()
        .answer(request.context_id, &request.question)
        .await?;
    Ok(Json(answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutosConfig;
    use crate::providers::llm::fake::FakeLlm;
    use crate::storage::Database;
    use std::sync::Arc;

    #[tokio::test]
    async fn blank_questions_are_rejected_before_the_llm_is_called() {
        let store = Arc::new(Database::in_memory().unwrap());
        let llm = Arc::new(FakeLlm::with_text("resposta"));
        let state = AppState::with_providers(
            AutosConfig::default(),
            store,
            Arc::clone(&llm) as Arc<dyn crate::providers::llm::LlmProvider>,
        )
        .unwrap();

        let err = query(
            State(state),
            Json(QueryRequest {
                context_id: 1,
                question: "   ".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert_eq!(llm.request_count(), 0);
    }
}
