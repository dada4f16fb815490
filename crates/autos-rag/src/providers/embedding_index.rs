//! Embedding index contract
//!
//! The vector index is an external collaborator; the core talks to it
//! through this trait. Vectors are 3072-dimensional floats; records are
//! keyed by document id within a case context and natureza.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One embedded document projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Index record id
    pub id: String,
    /// Id of the persisted document the vector was derived from
    pub document_id: String,
    /// Case context
    pub context_id: i64,
    /// Natureza key of the source document
    pub natureza: i32,
    /// PJe document id
    pub pje_id: String,
    /// Embedding vector
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub vector: Vec<f32>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Field filter for semantic search
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub context_id: Option<i64>,
    pub natureza: Option<i32>,
}

/// A record with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: EmbeddingRecord,
    pub score: f32,
}

/// Operations the core issues against the vector index
#[async_trait]
pub trait EmbeddingIndex: Send + Sync {
    /// Persist a record; returns the index record id
    async fn index(&self, record: EmbeddingRecord) -> Result<String>;

    /// Replace the vector of an existing record
    async fn update(&self, id: &str, vector: Vec<f32>) -> Result<()>;

    /// Remove a record
    async fn delete(&self, id: &str) -> Result<()>;

    /// Fetch a record by id
    async fn get_by_id(&self, id: &str) -> Result<Option<EmbeddingRecord>>;

    /// Nearest records to `vector`, best first, honoring the filter
    async fn semantic_search(
        &self,
        vector: &[f32],
        filter: SearchFilter,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>>;

    /// Whether a record already exists for this (context, PJe id) pair
    async fn exists(&self, context_id: i64, pje_id: &str) -> Result<bool>;
}
