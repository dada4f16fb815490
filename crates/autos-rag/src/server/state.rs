//! Application state
//!
//! Every service object is constructed exactly once here and handed to the
//! routes by reference through the shared state; nothing hides behind a
//! process-wide global.

use std::sync::Arc;

use crate::config::AutosConfig;
use crate::error::Result;
use crate::ingestion::CaseFileExtractor;
use crate::pipeline::{
    IngestPipeline, ReviewService, DEFAULT_EXTRACTION_PROMPT, DEFAULT_SENTENCA_PROMPT,
    PROMPT_ANALISE_AUTUACAO, PROMPT_RAG_FORMATA_SENTENCA,
};
use crate::providers::embedding_index::EmbeddingIndex;
use crate::providers::llm::LlmProvider;
use crate::providers::openai::OpenAiClient;
use crate::rag::{RagOrchestrator, ToolRegistry};
use crate::storage::{Database, SqliteEmbeddingStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AutosConfig,
    store: Arc<Database>,
    llm: Arc<dyn LlmProvider>,
    embeddings: Arc<dyn EmbeddingIndex>,
    extractor: CaseFileExtractor,
    pipeline: IngestPipeline,
    review: ReviewService,
    rag: RagOrchestrator,
}

impl AppState {
    /// Build the state with the production LLM client
    pub fn new(config: AutosConfig) -> Result<Self> {
        let store = Arc::new(Database::new(&config.storage.db_path)?);
        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiClient::new(&config.llm)?);
        Self::with_providers(config, store, llm)
    }

    /// Build the state over explicit collaborators
    pub fn with_providers(
        config: AutosConfig,
        store: Arc<Database>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        tracing::info!(llm = llm.name(), "initializing application state");

        // Prompt families must exist before the first batch runs; the seeds
        // can be replaced in the prompt store at any time.
        store.seed_prompt(PROMPT_ANALISE_AUTUACAO, DEFAULT_EXTRACTION_PROMPT)?;
        store.seed_prompt(PROMPT_RAG_FORMATA_SENTENCA, DEFAULT_SENTENCA_PROMPT)?;

        let embeddings: Arc<dyn EmbeddingIndex> = Arc::new(SqliteEmbeddingStore::new(&store));

        let extractor = CaseFileExtractor::new(Arc::clone(&store), config.ingestion.clone());
        let pipeline = IngestPipeline::new(
            Arc::clone(&store),
            Arc::clone(&llm),
            Arc::clone(&embeddings),
            &config.processing,
        );
        let review = ReviewService::new(
            Arc::clone(&store),
            Arc::clone(&llm),
            &config.ingestion,
            &config.processing,
        );
        let rag = RagOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&llm),
            ToolRegistry::for_case_documents(Arc::clone(&store)),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                llm,
                embeddings,
                extractor,
                pipeline,
                review,
                rag,
            }),
        })
    }

    pub fn config(&self) -> &AutosConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<Database> {
        &self.inner.store
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    pub fn embeddings(&self) -> &Arc<dyn EmbeddingIndex> {
        &self.inner.embeddings
    }

    pub fn extractor(&self) -> &CaseFileExtractor {
        &self.inner.extractor
    }

    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    pub fn review(&self) -> &ReviewService {
        &self.inner.review
    }

    pub fn rag(&self) -> &RagOrchestrator {
        &self.inner.rag
    }
}
