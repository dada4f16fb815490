//! Document-nature key space and type-hint lookup tables
//!
//! The key space is fixed: seventeen substantive procedural document types
//! plus catch-all buckets for the whole case file, unclassified attachments,
//! certificates and movement-log noise.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NATU_DOC_INICIAL: i32 = 1;
pub const NATU_DOC_CONTESTACAO: i32 = 2;
pub const NATU_DOC_REPLICA: i32 = 3;
pub const NATU_DOC_DESP_INI: i32 = 4;
pub const NATU_DOC_DESP_ORD: i32 = 5;
pub const NATU_DOC_PETICAO: i32 = 6;
pub const NATU_DOC_DECISAO: i32 = 7;
pub const NATU_DOC_SENTENCA: i32 = 8;
pub const NATU_DOC_EMBARGOS: i32 = 9;
pub const NATU_DOC_CONTRA_RAZ: i32 = 10;
pub const NATU_DOC_APELACAO: i32 = 11;
pub const NATU_DOC_PROCURACAO: i32 = 12;
pub const NATU_DOC_ROL_TESTEMUNHAS: i32 = 13;
pub const NATU_DOC_CONTRATO: i32 = 14;
pub const NATU_DOC_LAUDO_PERICIA: i32 = 15;
pub const NATU_DOC_ATA_AUDIENCIA: i32 = 16;
pub const NATU_DOC_PARECER_MP: i32 = 17;

pub const NATU_DOC_AUTOS: i32 = 1000;
pub const NATU_DOC_OUTROS: i32 = 1001;
pub const NATU_DOC_CERTIDAO: i32 = 1002;
pub const NATU_DOC_MOVIMENTACAO: i32 = 1003;

/// A classified document nature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Natureza {
    pub key: i32,
    pub description: String,
}

impl Natureza {
    pub fn new(key: i32) -> Self {
        Self {
            key,
            description: description(key).to_string(),
        }
    }
}

struct Entry {
    key: i32,
    /// Denominations of the type as they appear in the export index
    hints: &'static [&'static str],
}

/// Recognized type hints, with the synonyms the PJe index uses
static ENTRIES: &[Entry] = &[
    Entry {
        key: NATU_DOC_INICIAL,
        hints: &["Petição Inicial", "Emenda à Inicial"],
    },
    Entry {
        key: NATU_DOC_CONTESTACAO,
        hints: &["Contestação"],
    },
    Entry {
        key: NATU_DOC_REPLICA,
        hints: &["Réplica"],
    },
    Entry {
        key: NATU_DOC_DESP_INI,
        hints: &["Despacho inicial"],
    },
    Entry {
        key: NATU_DOC_DESP_ORD,
        hints: &["Despacho", "Despacho Ordinatório"],
    },
    Entry {
        key: NATU_DOC_PETICAO,
        hints: &[
            "Petição",
            "Alegações",
            "Alegações Finais",
            "Memoriais",
            "Manifestação",
            "Manifestação da Defensoria Pública",
            "Exceção de Pré-Executividade",
            "Pedido",
            "Informações",
            "Petição de Habilitação",
            "Petição intercorrente",
            "Petição intermediária",
            "Petição Requerendo",
            "Proposta de acordo",
            "Razões",
            "Reconvenção",
        ],
    },
    Entry {
        key: NATU_DOC_DECISAO,
        hints: &["Decisão", "Decisão interlocutória"],
    },
    Entry {
        key: NATU_DOC_SENTENCA,
        hints: &["Sentença"],
    },
    Entry {
        key: NATU_DOC_EMBARGOS,
        hints: &["Embargos de Declaração"],
    },
    Entry {
        key: NATU_DOC_CONTRA_RAZ,
        hints: &["Contra-razões", "Contrarazões"],
    },
    Entry {
        key: NATU_DOC_APELACAO,
        hints: &["Recurso de Apelação", "Apelação", "Recurso"],
    },
    Entry {
        key: NATU_DOC_PROCURACAO,
        hints: &["Procuração"],
    },
    Entry {
        key: NATU_DOC_ROL_TESTEMUNHAS,
        hints: &["Rol de Testemunhas"],
    },
    Entry {
        key: NATU_DOC_CONTRATO,
        hints: &["Contrato"],
    },
    Entry {
        key: NATU_DOC_LAUDO_PERICIA,
        hints: &[
            "Laudo",
            "Laudo Pericial",
            "Laudo de Perícia",
            "Laudo Perícia Médica",
            "Laudo Médico",
            "Laudo Psicológico",
            "Perícia",
        ],
    },
    Entry {
        key: NATU_DOC_ATA_AUDIENCIA,
        hints: &[
            "Ata de Audiência",
            "Ata de Julgamento",
            "Ata de Audiência de Conciliação",
            "Ata de Audiência de Instrução",
            "Ata de Audiência de Instrução e Julgamento",
            "Termo de Audiência",
            "Termo de Audiência - com acordo",
            "Termo de Audiência - sem acordo",
        ],
    },
    Entry {
        key: NATU_DOC_PARECER_MP,
        hints: &[
            "Parecer do Ministério Público",
            "Manifestação do MP",
            "Manifestação do Ministério Público",
        ],
    },
    Entry {
        key: NATU_DOC_AUTOS,
        hints: &["Autos Processuais", "Autos"],
    },
    Entry {
        key: NATU_DOC_OUTROS,
        hints: &["Outros Documentos", "Documentos Diversos", "Documento Diverso"],
    },
    Entry {
        key: NATU_DOC_CERTIDAO,
        hints: &["Certidão", "Certidões"],
    },
    Entry {
        key: NATU_DOC_MOVIMENTACAO,
        hints: &["Movimentação", "Processo"],
    },
];

/// Keys whose documents are imported into the main corpus. Catch-all
/// buckets and unknown type hints stay out by design.
pub const IMPORTABLE_KEYS: &[i32] = &[
    NATU_DOC_INICIAL,
    NATU_DOC_CONTESTACAO,
    NATU_DOC_REPLICA,
    NATU_DOC_DESP_INI,
    NATU_DOC_DESP_ORD,
    NATU_DOC_PETICAO,
    NATU_DOC_DECISAO,
    NATU_DOC_SENTENCA,
    NATU_DOC_EMBARGOS,
    NATU_DOC_CONTRA_RAZ,
    NATU_DOC_APELACAO,
    NATU_DOC_PROCURACAO,
    NATU_DOC_ROL_TESTEMUNHAS,
    NATU_DOC_CONTRATO,
    NATU_DOC_LAUDO_PERICIA,
    NATU_DOC_ATA_AUDIENCIA,
    NATU_DOC_PARECER_MP,
];

/// Keys that define the cause of action; their structured JSON gets an
/// embedding after persistence.
pub const CAUSE_DEFINING_KEYS: &[i32] = &[
    NATU_DOC_INICIAL,
    NATU_DOC_CONTESTACAO,
    NATU_DOC_REPLICA,
    NATU_DOC_PETICAO,
    NATU_DOC_PARECER_MP,
];

static HINT_TO_KEY: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for entry in ENTRIES {
        for hint in entry.hints {
            map.insert(normalize_hint(hint), entry.key);
        }
    }
    map
});

static KEY_TO_DESCRIPTION: Lazy<HashMap<i32, &'static str>> = Lazy::new(|| {
    ENTRIES
        .iter()
        .filter(|e| !e.hints.is_empty())
        .map(|e| (e.key, e.hints[0]))
        .collect()
});

static TRAILING_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^()]*\)$").unwrap());

/// Lowercase, strip accents and drop a trailing parenthesised complement,
/// so index hints like "Contestação (com documentos)" still resolve.
fn normalize_hint(hint: &str) -> String {
    let stripped = TRAILING_PARENS.replace(hint.trim(), "");
    stripped
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ã' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'õ' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'Á' | 'À' | 'Ã' | 'Â' | 'Ä' => 'a',
            'É' | 'È' | 'Ê' | 'Ë' => 'e',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
            'Ó' | 'Ò' | 'Õ' | 'Ô' | 'Ö' => 'o',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
            'Ç' => 'c',
            _ => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Map an index type hint to its natureza key. Unknown hints fall into the
/// unclassified bucket.
pub fn key_for_hint(hint: &str) -> i32 {
    HINT_TO_KEY
        .get(&normalize_hint(hint))
        .copied()
        .unwrap_or(NATU_DOC_OUTROS)
}

/// Primary description for a key
pub fn description(key: i32) -> &'static str {
    KEY_TO_DESCRIPTION.get(&key).copied().unwrap_or("não identificado")
}

/// Whether documents of this key are imported into the main corpus
pub fn is_importable(key: i32) -> bool {
    IMPORTABLE_KEYS.contains(&key)
}

/// Whether this key is one of the catch-all buckets (unclassified,
/// certificate, movement log)
pub fn is_catch_all(key: i32) -> bool {
    matches!(key, NATU_DOC_OUTROS | NATU_DOC_CERTIDAO | NATU_DOC_MOVIMENTACAO)
}

/// Whether this key triggers embedding of the structured JSON
pub fn is_cause_defining(key: i32) -> bool {
    CAUSE_DEFINING_KEYS.contains(&key)
}

/// All type hints in the fixed lookup table, with the key each resolves to
pub fn all_hints() -> Vec<(&'static str, i32)> {
    ENTRIES
        .iter()
        .flat_map(|e| e.hints.iter().map(move |h| (*h, e.key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_resolve_case_and_accent_insensitively() {
        assert_eq!(key_for_hint("Contestação"), NATU_DOC_CONTESTACAO);
        assert_eq!(key_for_hint("contestacao"), NATU_DOC_CONTESTACAO);
        assert_eq!(key_for_hint("CONTESTAÇÃO"), NATU_DOC_CONTESTACAO);
        assert_eq!(key_for_hint("Sentença"), NATU_DOC_SENTENCA);
        assert_eq!(key_for_hint("Petição Inicial"), NATU_DOC_INICIAL);
    }

    #[test]
    fn trailing_complement_is_ignored() {
        assert_eq!(
            key_for_hint("Contestação (com documentos)"),
            NATU_DOC_CONTESTACAO
        );
        assert_eq!(key_for_hint("Sentença (mérito)"), NATU_DOC_SENTENCA);
    }

    #[test]
    fn unknown_hints_fall_into_the_unclassified_bucket() {
        assert_eq!(key_for_hint("Comprovante de Residência"), NATU_DOC_OUTROS);
        assert_eq!(key_for_hint(""), NATU_DOC_OUTROS);
    }

    #[test]
    fn certificates_and_movements_are_not_importable() {
        assert!(!is_importable(key_for_hint("Certidão")));
        assert!(!is_importable(key_for_hint("Movimentação")));
        assert!(!is_importable(NATU_DOC_AUTOS));
        assert!(!is_importable(NATU_DOC_OUTROS));
    }

    // Every hint in the fixed table either resolves to an allow-listed key
    // or is correctly rejected. Exhaustive by construction.
    #[test]
    fn allow_list_is_exhaustive_over_the_lookup_table() {
        for (hint, expected_key) in all_hints() {
            let key = key_for_hint(hint);
            assert_eq!(key, expected_key, "hint {:?} resolved to {}", hint, key);
            if (1..=17).contains(&key) {
                assert!(is_importable(key), "substantive key {} must import", key);
            } else {
                assert!(!is_importable(key), "catch-all key {} must reject", key);
            }
        }
    }

    #[test]
    fn cause_defining_subset_is_fixed() {
        assert!(is_cause_defining(NATU_DOC_INICIAL));
        assert!(is_cause_defining(NATU_DOC_CONTESTACAO));
        assert!(is_cause_defining(NATU_DOC_REPLICA));
        assert!(is_cause_defining(NATU_DOC_PETICAO));
        assert!(is_cause_defining(NATU_DOC_PARECER_MP));
        assert!(!is_cause_defining(NATU_DOC_SENTENCA));
        assert!(!is_cause_defining(NATU_DOC_PROCURACAO));
    }

    #[test]
    fn descriptions_cover_all_keys() {
        assert_eq!(description(NATU_DOC_CONTESTACAO), "Contestação");
        assert_eq!(description(NATU_DOC_CERTIDAO), "Certidão");
        assert_eq!(description(9999), "não identificado");
    }
}
