//! Provider abstractions for the LLM service and the embedding index
//!
//! Trait seams keep the core pipelines independent of the concrete
//! collaborators: the completion/embedding API and the vector index are
//! external services from the core's point of view.

pub mod embedding_index;
pub mod llm;
pub mod openai;

pub use embedding_index::{EmbeddingIndex, EmbeddingRecord, ScoredRecord, SearchFilter};
pub use llm::LlmProvider;
pub use openai::OpenAiClient;
