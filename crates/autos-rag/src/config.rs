//! Configuration for the ingestion and RAG service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutosConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM/embeddings API configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Record store configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Segmentation and classification configuration
    #[serde(default)]
    pub ingestion: IngestionConfig,
    /// Batch processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Temp-document retention configuration
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl AutosConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("invalid config file: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// LLM and embeddings API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// API key; falls back to the OPENAI_API_KEY environment variable when empty
    #[serde(default)]
    pub api_key: String,
    /// Generation model name
    pub model: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding dimensions (3072 for text-embedding-3-large)
    pub embedding_dimensions: usize,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum completion tokens per call
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4.1-mini".to_string(),
            embed_model: "text-embedding-3-large".to_string(),
            embedding_dimensions: 3072,
            temperature: 0.2,
            max_output_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config or environment
    pub fn resolve_api_key(&self) -> Result<String> {
        if !self.api_key.is_empty() {
            return Ok(self.api_key.clone());
        }
        std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Config("no API key in config or OPENAI_API_KEY".to_string()))
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("autos-rag.db"),
        }
    }
}

/// Segmentation and classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Hard ceiling on document text size in bytes (default: 60 KB)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
    /// Marker ids are reduced to this many trailing digits to match the index keys
    #[serde(default = "default_marker_suffix_digits")]
    pub marker_suffix_digits: usize,
}

fn default_max_document_bytes() -> usize {
    60 * 1024
}

fn default_marker_suffix_digits() -> usize {
    9
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
            marker_suffix_digits: default_marker_suffix_digits(),
        }
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Maximum concurrent items in a batch fan-out
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Timeout for processing a single item in seconds
    #[serde(default = "default_item_timeout")]
    pub item_timeout_secs: u64,
}

fn default_max_concurrency() -> usize {
    8
}

fn default_item_timeout() -> u64 {
    120
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            item_timeout_secs: default_item_timeout(),
        }
    }
}

/// Temp-document retention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Interval between sweeper passes in seconds (default: 1 hour)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Temp documents older than this many hours are deleted (default: 24)
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    /// Timeout for a single sweeper pass in seconds (default: 2 minutes)
    #[serde(default = "default_run_timeout")]
    pub run_timeout_secs: u64,
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_max_age_hours() -> u64 {
    24
}

fn default_run_timeout() -> u64 {
    120
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            max_age_hours: default_max_age_hours(),
            run_timeout_secs: default_run_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AutosConfig::default();
        assert_eq!(config.ingestion.max_document_bytes, 60 * 1024);
        assert_eq!(config.ingestion.marker_suffix_digits, 9);
        assert_eq!(config.llm.embedding_dimensions, 3072);
        assert_eq!(config.retention.max_age_hours, 24);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AutosConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090
            enable_cors = false

            [processing]
            max_concurrency = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.processing.max_concurrency, 2);
        assert_eq!(config.processing.item_timeout_secs, 120);
        assert_eq!(config.retention.sweep_interval_secs, 3600);
    }
}
