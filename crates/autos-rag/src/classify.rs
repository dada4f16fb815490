//! Document classification
//!
//! Two paths assign a natureza to a text block. The deterministic path runs
//! at first ingestion: it resolves the block's reduced marker id against the
//! export index and maps the type hint through the fixed lookup table. The
//! semantic path runs during automated review: it asks the LLM under a
//! strict single-JSON-object contract, bucketing movement-log and
//! certificate noise before attempting a fine-grained key.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::IngestionConfig;
use crate::error::{Error, Result};
use crate::ingestion::IndexEntry;
use crate::natureza::{self, Natureza};
use crate::providers::llm::LlmProvider;
use crate::storage::Database;
use crate::types::llm::{ChatMessage, CompletionRequest};

/// Why a block was discarded by the deterministic path.
///
/// These are by-design filters, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Reduced marker id has no row in the export index
    NotInIndex,
    /// Type hint resolves to a key outside the importable allow-list
    NotImportable { type_hint: String, key: i32 },
    /// Text exceeds the hard size ceiling
    Oversized { size: usize, limit: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotInIndex => write!(f, "not in the index"),
            RejectReason::NotImportable { type_hint, key } => {
                write!(f, "type {:?} (key {}) not importable", type_hint, key)
            }
            RejectReason::Oversized { size, limit } => {
                write!(f, "size {} exceeds {} bytes", size, limit)
            }
        }
    }
}

/// Deterministic classification of one segmented block.
///
/// Looks the reduced marker id up in the export index, maps the type hint
/// to a natureza key, and enforces the importable allow-list and the size
/// ceiling.
pub fn classify_block(
    index: &HashMap<String, IndexEntry>,
    pje_id: &str,
    text: &str,
    config: &IngestionConfig,
) -> std::result::Result<Natureza, RejectReason> {
    let entry = index.get(pje_id).ok_or(RejectReason::NotInIndex)?;

    let key = natureza::key_for_hint(&entry.type_hint);
    if !natureza::is_importable(key) {
        return Err(RejectReason::NotImportable {
            type_hint: entry.type_hint.clone(),
            key,
        });
    }

    check_size(text, config.max_document_bytes).map_err(|(size, limit)| {
        tracing::info!(%pje_id, size, limit, "document over the size ceiling");
        RejectReason::Oversized { size, limit }
    })?;

    Ok(Natureza::new(key))
}

fn check_size(text: &str, limit: usize) -> std::result::Result<(), (usize, usize)> {
    let size = text.len();
    if size > limit {
        Err((size, limit))
    } else {
        Ok(())
    }
}

/// Instruction given to the model before the document text. The model must
/// bucket movement-log entries and certificate artifacts before attempting
/// a fine-grained key, and answer with exactly one JSON object.
const CLASSIFY_INSTRUCTION: &str = r#"O seguinte texto pertence aos autos de um processo judicial.

Primeiramente, verifique se o texto é uma movimentação, registro ou anotação processual, contendo expressões como:
"Mov.", "Movimentação", "Observações dos Movimentos", "Registro", "Publicação", "Entrada", "Intimação", "Anotação".
Se essas expressões estiverem presentes, e o texto não contiver o corpo formal completo da decisão (com fundamentação e conclusão explícita do juiz),
classifique o documento como:
- { "key": 1003, "description": "movimentação/processo" }.

Em seguida, verifique se o texto contém alguma das expressões indicativas de certidões ou outros documentos, tais como:
"certidão", "certifico que", "Por ordem do MM. Juiz", "teor do ato", "o referido é verdade, dou fé",
"encaminhado edital/relação para publicação", "ato ordinatório".

Se qualquer dessas expressões estiver presente em qualquer parte do texto, incluindo cabeçalhos, movimentações ou descrições, classifique o documento imediatamente como:
- { "key": 1002, "description": "certidões" } se for claramente certidão,
- caso contrário, classifique como { "key": 1001, "description": "outros documentos" }.

Somente se nenhuma dessas expressões estiver presente, analise o conteúdo para identificar a natureza do documento conforme as opções a seguir:

{ "key": 1, "description": "Petição inicial" }
{ "key": 2, "description": "Contestação" }
{ "key": 3, "description": "Réplica" }
{ "key": 4, "description": "Despacho inicial" }
{ "key": 5, "description": "Despacho" }
{ "key": 6, "description": "Petição" }
{ "key": 7, "description": "Decisão" }
{ "key": 8, "description": "Sentença" }
{ "key": 9, "description": "Embargos de declaração" }
{ "key": 10, "description": "Contra-razões" }
{ "key": 11, "description": "Recurso" }
{ "key": 12, "description": "Procuração" }
{ "key": 13, "description": "Rol de Testemunhas" }
{ "key": 14, "description": "Contrato" }
{ "key": 15, "description": "Laudo Pericial" }
{ "key": 16, "description": "Ata de audiência" }
{ "key": 17, "description": "Parecer do Ministério Público" }

Se não puder identificar claramente a natureza do texto, classifique como { "key": 1001, "description": "outros documentos" }.

Responda apenas com um JSON no formato: {"key": int, "description": string }."#;

/// Semantic classifier (review path)
pub struct SemanticClassifier {
    store: Arc<Database>,
    llm: Arc<dyn LlmProvider>,
    max_document_bytes: usize,
}

impl SemanticClassifier {
    pub fn new(store: Arc<Database>, llm: Arc<dyn LlmProvider>, config: &IngestionConfig) -> Self {
        Self {
            store,
            llm,
            max_document_bytes: config.max_document_bytes,
        }
    }

    /// Ask the model for the document's natureza.
    ///
    /// Any deviation from the single-JSON-object contract is a hard error
    /// for this item; there is no fallback and no automatic retry. Token
    /// usage is charged to the context before the response is parsed.
    pub async fn classify(&self, context_id: i64, text: &str) -> Result<Natureza> {
        if let Err((size, limit)) = check_size(text, self.max_document_bytes) {
            tracing::info!(context_id, size, limit, "document over the size ceiling");
            return Err(Error::rejected(format!(
                "size {} exceeds {} bytes",
                size, limit
            )));
        }

        let request = CompletionRequest::from_messages(vec![
            ChatMessage::user(CLASSIFY_INSTRUCTION),
            ChatMessage::user(text),
        ]);

        let response = self.llm.submit(request).await?;
        self.store.add_token_usage(context_id, response.usage)?;

        let raw = response.output_text().trim().to_string();
        let natureza: Natureza = serde_json::from_str(&raw).map_err(|e| {
            tracing::warn!(context_id, error = %e, response = %raw, "unparseable classification");
            Error::malformed(format!("classification is not a JSON object: {}", e))
        })?;

        tracing::info!(
            context_id,
            key = natureza.key,
            description = %natureza.description,
            "natureza identified"
        );
        Ok(natureza)
    }
}
