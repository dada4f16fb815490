//! Persisted document records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::natureza::Natureza;

/// A segmented-and-cleaned document awaiting classification and structuring
/// (the "autos_temp" record). Deleted once promoted to a [`Document`],
/// permanently rejected, or swept past the retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempDocument {
    /// Record id
    pub id: String,
    /// Case context the document belongs to
    pub context_id: i64,
    /// Natureza key assigned so far (0 when still unknown)
    pub natureza: i32,
    /// PJe document id (reduced marker id)
    pub pje_id: String,
    /// Cleaned document text
    pub text: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// The durable, classified artifact (the "autos" record).
///
/// At most one may exist per `(context_id, pje_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Record id
    pub id: String,
    /// Case context the document belongs to
    pub context_id: i64,
    /// Natureza key
    pub natureza: i32,
    /// PJe document id
    pub pje_id: String,
    /// Raw document text
    pub raw_text: String,
    /// Structured extraction produced by the LLM
    pub structured_json: Option<serde_json::Value>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Minimum shape the structured-extraction response must parse as.
///
/// Field names follow the wire format the extraction prompts demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Classified document type
    pub tipo: Natureza,
    /// Case number
    #[serde(default)]
    pub processo: String,
    /// PJe document id
    pub id_pje: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracted_document_parses_minimum_schema() {
        let raw = r#"{
            "tipo": { "key": 2, "description": "Contestação" },
            "processo": "0001234-56.2024.8.10.0001",
            "id_pje": "110935393",
            "partes": { "autor": "Fulano", "reu": "Sicrano" }
        }"#;

        let doc: ExtractedDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.tipo.key, 2);
        assert_eq!(doc.id_pje, "110935393");
    }

    #[test]
    fn extracted_document_rejects_missing_id_pje() {
        let raw = r#"{ "tipo": { "key": 2, "description": "Contestação" } }"#;
        assert!(serde_json::from_str::<ExtractedDocument>(raw).is_err());
    }
}
