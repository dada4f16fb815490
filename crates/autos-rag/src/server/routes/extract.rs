//! Merged-export extraction endpoint

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::api::ExtractOutcome;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub context_id: i64,
    /// Merged plain-text export of the whole case file
    pub text: String,
}

/// POST /api/extract - segment a merged export into temp documents
pub async fn extract_case_file(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractOutcome>> {
    if request.text.trim().is_empty() {
        return Err(Error::Config("text must not be empty".to_string()));
    }

    // Segmentation is CPU-bound over a potentially large blob; keep it off
    // the async worker.
    let outcome = tokio::task::spawn_blocking(move || {
        state.extractor().extract(request.context_id, &request.text)
    })
    .await
    .map_err(|e| Error::internal(format!("extraction task failed: {}", e)))?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutosConfig;
    use crate::providers::llm::fake::FakeLlm;
    use crate::storage::Database;
    use std::sync::Arc;

    fn state() -> AppState {
        let store = Arc::new(Database::in_memory().unwrap());
        AppState::with_providers(
            AutosConfig::default(),
            store,
            Arc::new(FakeLlm::with_text("{}")),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn empty_text_is_a_request_shape_error() {
        let err = extract_case_file(
            State(state()),
            Json(ExtractRequest {
                context_id: 1,
                text: "  ".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn extraction_reports_saved_and_skipped_blocks() {
        let mut text = String::new();
        text.push_str("110000001   10/03/2024   Contestação do réu   Contestação\n09:05\n");
        text.push_str("CONTESTAÇÃO\ncorpo\n");
        text.push_str("Num. 2024110000001 - Pág. 1\n");

        let Json(outcome) = extract_case_file(
            State(state()),
            Json(ExtractRequest {
                context_id: 3,
                text,
            }),
        )
        .await
        .unwrap();

        assert_eq!(outcome.saved, vec!["110000001"]);
        assert!(outcome.skipped.is_empty());
    }
}
