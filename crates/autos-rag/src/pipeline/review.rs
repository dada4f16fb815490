//! Bulk natureza review of a context's temp documents
//!
//! First verification pass over everything the segmenter extracted: each
//! temp document is classified semantically, and the ones that turn out to
//! be movement-log noise, certificates or unclassifiable attachments are
//! deleted before the ingestion pipeline ever sees them.

use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::classify::SemanticClassifier;
use crate::config::{IngestionConfig, ProcessingConfig};
use crate::error::{Error, Result};
use crate::natureza;
use crate::providers::llm::LlmProvider;
use crate::storage::Database;

/// Result of one review pass
#[derive(Debug, Default, Serialize)]
pub struct ReviewOutcome {
    /// Temp documents confirmed as substantive, with the key assigned
    pub kept: Vec<ReviewedDocument>,
    /// Temp documents deleted as noise
    pub removed: Vec<String>,
    /// Temp documents whose classification failed; left in place
    pub failed: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewedDocument {
    pub pje_id: String,
    pub natureza: i32,
}

/// Runs the semantic classifier over a whole context
pub struct ReviewService {
    store: Arc<Database>,
    classifier: SemanticClassifier,
    max_concurrency: usize,
}

impl ReviewService {
    pub fn new(
        store: Arc<Database>,
        llm: Arc<dyn LlmProvider>,
        ingestion: &IngestionConfig,
        processing: &ProcessingConfig,
    ) -> Self {
        let classifier = SemanticClassifier::new(Arc::clone(&store), llm, ingestion);
        Self {
            store,
            classifier,
            max_concurrency: processing.max_concurrency.max(1),
        }
    }

    /// Classify every temp document of the context, deleting catch-all and
    /// rejected ones. Per-item errors are collected, never fatal; the store
    /// serializes the shared deletion path.
    pub async fn review_context(&self, context_id: i64) -> Result<ReviewOutcome> {
        let rows = self.store.list_temp_documents(context_id)?;
        if rows.is_empty() {
            return Err(Error::not_found(format!(
                "no temp documents for context {}",
                context_id
            )));
        }
        tracing::info!(context_id, documents = rows.len(), "review started");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        let item_futures: Vec<_> = rows
            .into_iter()
            .map(|row| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let _permit = semaphore.acquire().await.unwrap();
                    let verdict = self.classifier.classify(context_id, &row.text).await;
                    (row, verdict)
                }
            })
            .collect();

        let results = join_all(item_futures).await;

        let mut outcome = ReviewOutcome::default();
        for (row, verdict) in results {
            match verdict {
                Ok(natureza) if natureza::is_catch_all(natureza.key) => {
                    tracing::info!(
                        pje_id = %row.pje_id,
                        key = natureza.key,
                        "temp document removed as noise"
                    );
                    if let Err(e) = self.store.delete_temp_document(&row.id) {
                        tracing::error!(pje_id = %row.pje_id, error = %e, "delete failed");
                        outcome.failed.push(row.pje_id);
                    } else {
                        outcome.removed.push(row.pje_id);
                    }
                }
                Ok(natureza) => {
                    outcome.kept.push(ReviewedDocument {
                        pje_id: row.pje_id,
                        natureza: natureza.key,
                    });
                }
                Err(Error::Rejected(reason)) => {
                    // Over the size ceiling: discarded by design
                    tracing::info!(pje_id = %row.pje_id, %reason, "temp document rejected");
                    if let Err(e) = self.store.delete_temp_document(&row.id) {
                        tracing::error!(pje_id = %row.pje_id, error = %e, "delete failed");
                        outcome.failed.push(row.pje_id);
                    } else {
                        outcome.removed.push(row.pje_id);
                    }
                }
                Err(e) => {
                    tracing::error!(pje_id = %row.pje_id, error = %e, "classification failed");
                    outcome.failed.push(row.pje_id);
                }
            }
        }

        tracing::info!(
            context_id,
            kept = outcome.kept.len(),
            removed = outcome.removed.len(),
            failed = outcome.failed.len(),
            "review finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::natureza::NATU_DOC_SENTENCA;
    use crate::providers::llm::fake::{text_response, FakeLlm};
    use crate::types::llm::TokenUsage;

    fn service(llm: Arc<FakeLlm>, store: Arc<Database>) -> ReviewService {
        ReviewService::new(
            store,
            llm,
            &IngestionConfig::default(),
            &ProcessingConfig {
                max_concurrency: 1, // deterministic response ordering
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn catch_all_documents_are_deleted_and_substantive_ones_kept() {
        let store = Arc::new(Database::in_memory().unwrap());
        store.insert_temp_document(1, 0, "100", "sentença completa").unwrap();
        store.insert_temp_document(1, 0, "200", "Mov. intimação").unwrap();

        let llm = Arc::new(FakeLlm::with_responses(vec![
            text_response(
                "r1",
                r#"{"key": 8, "description": "Sentença"}"#,
                TokenUsage::new(10, 2),
            ),
            text_response(
                "r2",
                r#"{"key": 1003, "description": "movimentação/processo"}"#,
                TokenUsage::new(10, 2),
            ),
        ]));

        let outcome = service(llm, Arc::clone(&store)).review_context(1).await.unwrap();

        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept[0].pje_id, "100");
        assert_eq!(outcome.kept[0].natureza, NATU_DOC_SENTENCA);
        assert_eq!(outcome.removed, vec!["200".to_string()]);

        let remaining = store.list_temp_documents(1).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].pje_id, "100");
    }

    #[tokio::test]
    async fn classification_errors_leave_the_temp_document_in_place() {
        let store = Arc::new(Database::in_memory().unwrap());
        store.insert_temp_document(1, 0, "100", "texto").unwrap();

        let llm = Arc::new(FakeLlm::with_text("isso não é JSON"));
        let outcome = service(llm, Arc::clone(&store)).review_context(1).await.unwrap();

        assert_eq!(outcome.failed, vec!["100".to_string()]);
        assert_eq!(store.list_temp_documents(1).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_context_is_not_found() {
        let store = Arc::new(Database::in_memory().unwrap());
        let llm = Arc::new(FakeLlm::with_text("{}"));
        let err = service(llm, store).review_context(9).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn oversized_documents_are_discarded() {
        let store = Arc::new(Database::in_memory().unwrap());
        let huge = "x".repeat(IngestionConfig::default().max_document_bytes + 1);
        store.insert_temp_document(1, 0, "100", &huge).unwrap();

        let llm = Arc::new(FakeLlm::with_text(r#"{"key": 8, "description": "Sentença"}"#));
        let outcome = service(llm, Arc::clone(&store)).review_context(1).await.unwrap();

        assert_eq!(outcome.removed, vec!["100".to_string()]);
        assert!(store.list_temp_documents(1).unwrap().is_empty());
    }
}
