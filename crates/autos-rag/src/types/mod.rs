//! Core types for the ingestion and RAG pipelines

pub mod api;
pub mod document;
pub mod llm;

pub use api::{BatchOutcome, ExtractOutcome, IngestItem, SkippedDocument};
pub use document::{Document, ExtractedDocument, TempDocument};
pub use llm::{
    ChatMessage, CompletionRequest, Embedding, LlmResponse, OutputItem, Role, TokenUsage,
    ToolOutput, ToolSpec,
};
