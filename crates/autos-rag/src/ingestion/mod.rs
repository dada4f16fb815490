//! Segmentation of merged case-file exports
//!
//! A merged export is one large text blob covering every procedural document
//! of a case, produced by converting the PJe PDF to plain text. Two
//! independent scans run over it: the index scan recovers the table of
//! contents from the header pages, and the marker scan splits the body into
//! per-document blocks. Blocks that pass deterministic classification are
//! persisted as temp documents for the ingestion pipeline.

pub mod footer;
pub mod index;
pub mod segment;

pub use footer::strip_footer;
pub use index::{parse_index, IndexEntry};
pub use segment::{last_n_digits, segment, DocumentBlock};

use std::sync::Arc;

use crate::classify;
use crate::config::IngestionConfig;
use crate::storage::Database;
use crate::types::api::{ExtractOutcome, SkippedDocument};

/// Strip non-printable control characters from a line, preserving tabs as
/// column separators.
pub(crate) fn strip_control_chars(line: &str) -> String {
    line.chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .collect()
}

/// Splits one merged export into temp documents
pub struct CaseFileExtractor {
    store: Arc<Database>,
    config: IngestionConfig,
}

impl CaseFileExtractor {
    pub fn new(store: Arc<Database>, config: IngestionConfig) -> Self {
        Self { store, config }
    }

    /// Segment `text`, classify each block against the export index, and
    /// persist the importable ones as temp documents of `context_id`.
    ///
    /// Rejections (unknown id, non-importable type, size ceiling) are by
    /// design and reported in the outcome, not as errors. Storage failures
    /// on one block do not stop the remaining blocks.
    pub fn extract(&self, context_id: i64, text: &str) -> ExtractOutcome {
        let index = parse_index(text);
        let blocks = segment(text);
        tracing::info!(
            context_id,
            index_entries = index.len(),
            blocks = blocks.len(),
            "export segmented"
        );

        let mut outcome = ExtractOutcome::default();

        for block in blocks {
            let pje_id = last_n_digits(&block.marker_id, self.config.marker_suffix_digits);
            let doc_text = strip_footer(&block.text());

            let natureza = match classify::classify_block(&index, &pje_id, &doc_text, &self.config)
            {
                Ok(natureza) => natureza,
                Err(reason) => {
                    tracing::info!(%pje_id, %reason, "block not saved");
                    outcome.skipped.push(SkippedDocument {
                        pje_id,
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };

            match self
                .store
                .insert_temp_document(context_id, natureza.key, &pje_id, &doc_text)
            {
                Ok(_) => {
                    tracing::info!(%pje_id, key = natureza.key, tipo = %natureza.description, "block saved");
                    outcome.saved.push(pje_id);
                }
                Err(e) => {
                    tracing::error!(%pje_id, error = %e, "failed to persist temp document");
                    outcome.skipped.push(SkippedDocument {
                        pje_id,
                        reason: format!("storage error: {}", e),
                    });
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::natureza::{NATU_DOC_CONTESTACAO, NATU_DOC_INICIAL};

    fn sample_export() -> String {
        let mut text = String::new();
        // Index header
        text.push_str("110000001   10/03/2024   Petição Inicial da autora      Petição Inicial\n");
        text.push_str("14:32\n");
        text.push_str("110000002   12/03/2024   Contestação do réu             Contestação\n");
        text.push_str("09:05\n");
        text.push_str("110000003   20/03/2024   Certidão de citação            Certidão\n");
        text.push_str("10:00\n");
        // Body pages
        text.push_str("PETIÇÃO INICIAL\ntexto da inicial\n");
        text.push_str("Num. 2024110000001 - Pág. 1\n");
        text.push_str("CONTESTAÇÃO\ntexto da contestação\n");
        text.push_str("Num. 2024110000002 - Pág. 1\n");
        text.push_str("CERTIDÃO\ncertifico que\n");
        text.push_str("Num. 2024110000003 - Pág. 1\n");
        text.push_str("SEM ÍNDICE\npágina solta\n");
        text.push_str("Num. 2024110000009 - Pág. 1\n");
        text
    }

    fn extractor() -> (Arc<Database>, CaseFileExtractor) {
        let store = Arc::new(Database::in_memory().unwrap());
        let extractor = CaseFileExtractor::new(Arc::clone(&store), IngestionConfig::default());
        (store, extractor)
    }

    #[test]
    fn importable_blocks_become_temp_documents() {
        let (store, extractor) = extractor();
        let outcome = extractor.extract(7, &sample_export());

        assert_eq!(outcome.saved, vec!["110000001", "110000002"]);
        assert_eq!(outcome.skipped.len(), 2);

        let temps = store.list_temp_documents(7).unwrap();
        assert_eq!(temps.len(), 2);
        let inicial = temps.iter().find(|t| t.pje_id == "110000001").unwrap();
        assert_eq!(inicial.natureza, NATU_DOC_INICIAL);
        assert!(inicial.text.contains("texto da inicial"));
        let contestacao = temps.iter().find(|t| t.pje_id == "110000002").unwrap();
        assert_eq!(contestacao.natureza, NATU_DOC_CONTESTACAO);
    }

    #[test]
    fn certificate_blocks_are_rejected_and_nothing_persists_for_them() {
        let (store, extractor) = extractor();
        let outcome = extractor.extract(7, &sample_export());

        let certidao = outcome
            .skipped
            .iter()
            .find(|s| s.pje_id == "110000003")
            .unwrap();
        assert!(certidao.reason.contains("not importable"));
        assert!(store
            .list_temp_documents(7)
            .unwrap()
            .iter()
            .all(|t| t.pje_id != "110000003"));
    }

    #[test]
    fn blocks_absent_from_the_index_are_skipped() {
        let (_, extractor) = extractor();
        let outcome = extractor.extract(7, &sample_export());

        let loose = outcome
            .skipped
            .iter()
            .find(|s| s.pje_id == "110000009")
            .unwrap();
        assert!(loose.reason.contains("not in the index"));
    }

    #[test]
    fn markerless_export_saves_nothing() {
        let (store, extractor) = extractor();
        let outcome = extractor.extract(7, "texto corrido sem marcador algum\n");
        assert!(outcome.saved.is_empty());
        assert!(outcome.skipped.is_empty());
        assert!(store.list_temp_documents(7).unwrap().is_empty());
    }
}
