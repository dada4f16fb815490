//! Ingestion pipeline: temp document → structured, classified document
//!
//! Per-item flow: locate the temp document, check for a duplicate, run the
//! structured extraction against the LLM, persist the document, embed the
//! cause-defining ones, and only then drop the temp record. A batch fans
//! out per item under a bounded semaphore; one item failing never aborts
//! the rest.

pub mod ingest;
pub mod projection;
pub mod review;

pub use ingest::IngestPipeline;
pub use review::{ReviewOutcome, ReviewService};

/// Prompt family used for structured extraction of most documents
pub const PROMPT_ANALISE_AUTUACAO: i32 = 1;
/// Prompt family used to reformat judgments for retrieval
pub const PROMPT_RAG_FORMATA_SENTENCA: i32 = 300;

/// Default extraction prompt, seeded when the prompt store has none for the
/// family. Operators replace these through the prompt CRUD.
pub const DEFAULT_EXTRACTION_PROMPT: &str = r#"O texto a seguir é um documento dos autos de um processo judicial.
Extraia as informações do documento e responda APENAS com um objeto JSON, sem comentários, no formato:
{
  "tipo": { "key": int, "description": string },
  "processo": string,
  "id_pje": string,
  "partes": { "autor": string, "reu": string },
  "resumo": string,
  "fatos": string,
  "preliminares": [string],
  "pedidos": [string]
}
O campo "id_pje" é o número que identifica o documento no PJe (aparece como "Num. <número> - Pág."). Campos sem informação devem ser string vazia ou lista vazia."#;

/// Default judgment-reformatting prompt
pub const DEFAULT_SENTENCA_PROMPT: &str = r#"O texto a seguir é uma sentença judicial.
Responda APENAS com um objeto JSON no formato:
{
  "tipo": { "key": 8, "description": "Sentença" },
  "processo": string,
  "id_pje": string,
  "relatorio": string,
  "fundamentacao": string,
  "dispositivo": string
}
O campo "id_pje" é o número que identifica o documento no PJe. Campos sem informação devem ser string vazia."#;
