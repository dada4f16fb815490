//! Batch ingestion of temp documents into the document store

use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::ProcessingConfig;
use crate::error::{Error, Result};
use crate::natureza::{self, NATU_DOC_SENTENCA};
use crate::pipeline::{projection, PROMPT_ANALISE_AUTUACAO, PROMPT_RAG_FORMATA_SENTENCA};
use crate::providers::embedding_index::{EmbeddingIndex, EmbeddingRecord};
use crate::providers::llm::LlmProvider;
use crate::storage::Database;
use crate::types::api::{BatchOutcome, IngestItem};
use crate::types::document::ExtractedDocument;
use crate::types::llm::{ChatMessage, CompletionRequest};

/// Drives temp documents through extraction, persistence and embedding
pub struct IngestPipeline {
    store: Arc<Database>,
    llm: Arc<dyn LlmProvider>,
    embeddings: Arc<dyn EmbeddingIndex>,
    max_concurrency: usize,
    item_timeout: Duration,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<Database>,
        llm: Arc<dyn LlmProvider>,
        embeddings: Arc<dyn EmbeddingIndex>,
        config: &ProcessingConfig,
    ) -> Self {
        Self {
            store,
            llm,
            embeddings,
            max_concurrency: config.max_concurrency.max(1),
            item_timeout: Duration::from_secs(config.item_timeout_secs),
        }
    }

    /// Process a batch of items, fanning out under a bounded semaphore.
    ///
    /// Failures (including per-item timeouts) land in the failed list and
    /// never abort the rest of the batch.
    pub async fn run_batch(&self, items: Vec<IngestItem>) -> BatchOutcome {
        tracing::info!(items = items.len(), "ingestion batch started");
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        let item_futures: Vec<_> = items
            .into_iter()
            .map(|item| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let _permit = semaphore.acquire().await.unwrap();
                    let document_id = item.document_id.clone();

                    let result = match timeout(self.item_timeout, self.ingest_one(&item)).await {
                        Ok(inner) => inner,
                        Err(_) => Err(Error::internal(format!(
                            "item timed out after {}s",
                            self.item_timeout.as_secs()
                        ))),
                    };

                    (document_id, result)
                }
            })
            .collect();

        let results = join_all(item_futures).await;

        let mut outcome = BatchOutcome::default();
        for (document_id, result) in results {
            match result {
                Ok(()) => outcome.processed.push(document_id),
                Err(e) => {
                    tracing::error!(%document_id, error = %e, "item failed");
                    outcome.failed.push(document_id);
                }
            }
        }

        tracing::info!(
            processed = outcome.processed.len(),
            failed = outcome.failed.len(),
            "ingestion batch finished"
        );
        outcome
    }

    /// Run one temp document through extraction and persistence.
    ///
    /// The temp record is only deleted after every downstream persist step
    /// succeeded, so a failed item can be retried without losing state.
    async fn ingest_one(&self, item: &IngestItem) -> Result<()> {
        let temp = self
            .store
            .get_temp_document(&item.document_id)?
            .ok_or_else(|| {
                Error::not_found(format!("temp document {}", item.document_id))
            })?;
        tracing::info!(pje_id = %temp.pje_id, context_id = item.context_id, "item started");

        // Idempotency: an already-promoted document only needs its temp
        // record cleaned up.
        if self.store.document_exists(item.context_id, &temp.pje_id)? {
            tracing::info!(pje_id = %temp.pje_id, "document already persisted; skipping");
            self.store.delete_temp_document(&item.document_id)?;
            return Ok(());
        }

        let prompt_family = if temp.natureza == NATU_DOC_SENTENCA {
            PROMPT_RAG_FORMATA_SENTENCA
        } else {
            PROMPT_ANALISE_AUTUACAO
        };
        let prompt = self
            .store
            .get_prompt(prompt_family)?
            .ok_or_else(|| Error::not_found(format!("prompt family {}", prompt_family)))?;

        let request = CompletionRequest::from_messages(vec![
            ChatMessage::user(prompt),
            ChatMessage::user(temp.text.clone()),
        ]);
        let response = self.llm.submit(request).await?;
        self.store.add_token_usage(item.context_id, response.usage)?;

        let raw = response.output_text();
        let raw = raw.trim().trim_matches(['`', '"']).trim();
        let structured: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| Error::malformed(format!("extraction is not valid JSON: {}", e)))?;
        let extracted: ExtractedDocument = serde_json::from_value(structured.clone())
            .map_err(|e| Error::malformed(format!("extraction misses required fields: {}", e)))?;

        let document = match self.store.insert_document(
            item.context_id,
            extracted.tipo.key,
            &extracted.id_pje,
            &temp.text,
            Some(&structured),
        ) {
            Ok(document) => document,
            Err(Error::Duplicate { pje_id, .. }) => {
                // Lost the race to a concurrent item; same cleanup as the
                // idempotency check above.
                tracing::info!(%pje_id, "document persisted concurrently; skipping");
                self.store.delete_temp_document(&item.document_id)?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if natureza::is_cause_defining(extracted.tipo.key) {
            self.embed_document(&document, &structured).await?;
        }

        self.store.delete_temp_document(&item.document_id)?;
        tracing::info!(pje_id = %temp.pje_id, key = extracted.tipo.key, "item concluded");
        Ok(())
    }

    async fn embed_document(
        &self,
        document: &crate::types::document::Document,
        structured: &serde_json::Value,
    ) -> Result<()> {
        if self
            .embeddings
            .exists(document.context_id, &document.pje_id)
            .await?
        {
            tracing::info!(pje_id = %document.pje_id, "embedding already present; skipping");
            return Ok(());
        }

        let projection = projection::project_for_embedding(document.natureza, structured);
        let embedding = self.llm.embed(&projection).await?;
        self.store
            .add_token_usage(document.context_id, embedding.usage)?;

        self.embeddings
            .index(EmbeddingRecord {
                id: String::new(),
                document_id: document.id.clone(),
                context_id: document.context_id,
                natureza: document.natureza,
                pje_id: document.pje_id.clone(),
                vector: embedding.vector,
                created_at: Utc::now(),
            })
            .await?;

        Ok(())
    }
}
