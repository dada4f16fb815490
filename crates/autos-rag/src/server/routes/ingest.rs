//! Batch ingestion endpoint

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::api::{BatchOutcome, IngestItem};

/// POST /api/ingest - run a batch of temp documents through the pipeline.
///
/// Always answers 2xx with the processed/failed split; only a request-shape
/// problem (an empty batch) is a 4xx.
pub async fn ingest_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<IngestItem>>,
) -> Result<Json<BatchOutcome>> {
    if items.is_empty() {
        return Err(Error::Config("batch has no items".to_string()));
    }

    let outcome = state.pipeline().run_batch(items).await;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutosConfig;
    use crate::natureza::NATU_DOC_CONTESTACAO;
    use crate::providers::llm::fake::FakeLlm;
    use crate::storage::Database;
    use std::sync::Arc;

    #[tokio::test]
    async fn empty_batch_is_a_request_shape_error() {
        let store = Arc::new(Database::in_memory().unwrap());
        let state = AppState::with_providers(
            AutosConfig::default(),
            store,
            Arc::new(FakeLlm::with_text("{}")),
        )
        .unwrap();

        let err = ingest_batch(State(state), Json(vec![])).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn partial_failures_still_answer_with_the_split() {
        let store = Arc::new(Database::in_memory().unwrap());
        let temp = store
            .insert_temp_document(1, NATU_DOC_CONTESTACAO, "123", "texto")
            .unwrap();
        let state = AppState::with_providers(
            AutosConfig::default(),
            Arc::clone(&store),
            Arc::new(FakeLlm::with_text(
                r#"{"tipo": {"key": 2, "description": "Contestação"}, "processo": "", "id_pje": "123"}"#,
            )),
        )
        .unwrap();

        let Json(outcome) = ingest_batch(
            State(state),
            Json(vec![
                IngestItem {
                    context_id: 1,
                    document_id: temp.id.clone(),
                },
                IngestItem {
                    context_id: 1,
                    document_id: "fantasma".to_string(),
                },
            ]),
        )
        .await
        .unwrap();

        assert_eq!(outcome.processed, vec![temp.id]);
        assert_eq!(outcome.failed, vec!["fantasma".to_string()]);
    }
}
