//! Error types for the ingestion and RAG pipelines

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline and service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced record (temp document, prompt, document) is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// LLM output failed JSON/schema validation
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Document already persisted for this (context, PJe id) pair
    #[error("Duplicate document: context={context_id} id_pje={pje_id}")]
    Duplicate { context_id: i64, pje_id: String },

    /// Document discarded by design (type outside the allow-list, size ceiling)
    #[error("Document rejected: {0}")]
    Rejected(String),

    /// LLM or embedding service failed at the transport level
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding index error
    #[error("Embedding index error: {0}")]
    EmbeddingIndex(String),

    /// Record store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a rejection (by-design discard, not a failure)
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Error::MalformedResponse(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "malformed_response",
                msg.clone(),
            ),
            Error::Duplicate { context_id, pje_id } => (
                StatusCode::CONFLICT,
                "duplicate_document",
                format!("context={} id_pje={}", context_id, pje_id),
            ),
            Error::Rejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "rejected", msg.clone()),
            Error::Llm(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::EmbeddingIndex(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "embedding_index_error",
                msg.clone(),
            ),
            Error::Storage(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg.clone())
            }
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
