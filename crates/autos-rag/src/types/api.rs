//! Request/response payloads for the batch entry contracts

use serde::{Deserialize, Serialize};

/// One item of an ingestion batch: a temp document within a case context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestItem {
    pub context_id: i64,
    pub document_id: String,
}

/// Outcome of a batch run. Partial failures never fail the request;
/// callers get both lists back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub processed: Vec<String>,
    pub failed: Vec<String>,
}

/// A document skipped during extraction, with the reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub pje_id: String,
    pub reason: String,
}

/// Outcome of segmenting one merged export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractOutcome {
    /// PJe ids of the temp documents persisted
    pub saved: Vec<String>,
    /// Blocks discarded with the reason each was discarded
    pub skipped: Vec<SkippedDocument>,
}
