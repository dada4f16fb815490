//! autos-rag: case-file ingestion and question answering for PJe exports
//!
//! This crate takes the merged plain-text export of a legal case file, splits
//! it into the individual procedural documents it contains, classifies each
//! one, persists the importable ones, and answers questions over the result
//! through a two-phase tool-calling protocol against an LLM.

pub mod classify;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod natureza;
pub mod pipeline;
pub mod providers;
pub mod rag;
pub mod retention;
pub mod server;
pub mod storage;
pub mod types;

pub use config::AutosConfig;
pub use error::{Error, Result};
pub use natureza::Natureza;
pub use types::{
    document::{Document, TempDocument},
    llm::{ChatMessage, CompletionRequest, LlmResponse, OutputItem, TokenUsage},
};
