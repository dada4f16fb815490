//! Embedding projections of structured documents
//!
//! Only the fields that characterize the cause of action go into the
//! embedding text; boilerplate and party qualification stay out. Families
//! the projection does not know fall back to the compact JSON itself.

use serde::Deserialize;

use crate::natureza::{
    self, NATU_DOC_CONTESTACAO, NATU_DOC_INICIAL, NATU_DOC_PARECER_MP, NATU_DOC_PETICAO,
    NATU_DOC_REPLICA,
};
use crate::Natureza;

#[derive(Debug, Default, Deserialize)]
struct NaturezaJuridica {
    #[serde(default)]
    nome_juridico: String,
}

#[derive(Debug, Default, Deserialize)]
struct TutelaProvisoria {
    #[serde(default)]
    detalhes: String,
}

#[derive(Debug, Deserialize)]
struct PeticaoInicialJson {
    tipo: Option<Natureza>,
    #[serde(default)]
    natureza: NaturezaJuridica,
    #[serde(default)]
    fatos: String,
    #[serde(default)]
    preliminares: Vec<String>,
    #[serde(default)]
    atos_normativos: Vec<String>,
    #[serde(default)]
    pedidos: Vec<String>,
    #[serde(default)]
    tutela_provisoria: TutelaProvisoria,
}

#[derive(Debug, Deserialize)]
struct DefesaJson {
    tipo: Option<Natureza>,
    #[serde(default)]
    fatos: String,
    #[serde(default)]
    preliminares: Vec<String>,
    #[serde(default)]
    teses: Vec<String>,
    #[serde(default)]
    pedidos: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PeticaoJson {
    tipo: Option<Natureza>,
    #[serde(default)]
    resumo: String,
    #[serde(default)]
    fatos: String,
    #[serde(default)]
    pedidos: Vec<String>,
}

fn push_header(text: &mut String, tipo: &Option<Natureza>, natureza_key: i32) {
    match tipo {
        Some(tipo) => text.push_str(&format!("{}: ", tipo.description)),
        None => text.push_str(&format!("{}: ", natureza::description(natureza_key))),
    }
}

fn push_list(text: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    text.push_str(label);
    text.push_str(": ");
    for item in items {
        text.push_str(item);
        text.push_str("; ");
    }
}

fn project_inicial(doc: PeticaoInicialJson) -> String {
    let mut text = String::new();
    push_header(&mut text, &doc.tipo, NATU_DOC_INICIAL);
    if !doc.natureza.nome_juridico.is_empty() {
        text.push_str(&format!("Natureza Jurídica: {}; ", doc.natureza.nome_juridico));
    }
    if !doc.fatos.is_empty() {
        text.push_str(&format!("Fatos: {}; ", doc.fatos));
    }
    push_list(&mut text, "Preliminares", &doc.preliminares);
    push_list(&mut text, "Atos Normativos", &doc.atos_normativos);
    push_list(&mut text, "Pedidos", &doc.pedidos);
    if !doc.tutela_provisoria.detalhes.is_empty() {
        text.push_str(&format!("Tutela Provisória: {}; ", doc.tutela_provisoria.detalhes));
    }
    text.trim().to_string()
}

fn project_defesa(natureza_key: i32, doc: DefesaJson) -> String {
    let mut text = String::new();
    push_header(&mut text, &doc.tipo, natureza_key);
    if !doc.fatos.is_empty() {
        text.push_str(&format!("Fatos: {}; ", doc.fatos));
    }
    push_list(&mut text, "Preliminares", &doc.preliminares);
    push_list(&mut text, "Teses", &doc.teses);
    push_list(&mut text, "Pedidos", &doc.pedidos);
    text.trim().to_string()
}

fn project_peticao(natureza_key: i32, doc: PeticaoJson) -> String {
    let mut text = String::new();
    push_header(&mut text, &doc.tipo, natureza_key);
    if !doc.resumo.is_empty() {
        text.push_str(&format!("Resumo: {}; ", doc.resumo));
    }
    if !doc.fatos.is_empty() {
        text.push_str(&format!("Fatos: {}; ", doc.fatos));
    }
    push_list(&mut text, "Pedidos", &doc.pedidos);
    text.trim().to_string()
}

/// Build the embedding text for a structured document.
///
/// Falls back to the compact JSON when the family has no dedicated
/// projection or the JSON does not fit the expected shape.
pub fn project_for_embedding(natureza_key: i32, json: &serde_json::Value) -> String {
    let projected = match natureza_key {
        NATU_DOC_INICIAL => serde_json::from_value(json.clone()).map(project_inicial).ok(),
        NATU_DOC_CONTESTACAO | NATU_DOC_REPLICA => serde_json::from_value(json.clone())
            .map(|doc| project_defesa(natureza_key, doc))
            .ok(),
        NATU_DOC_PETICAO | NATU_DOC_PARECER_MP => serde_json::from_value(json.clone())
            .map(|doc| project_peticao(natureza_key, doc))
            .ok(),
        _ => None,
    };

    match projected {
        Some(text) if !text.is_empty() => text,
        _ => json.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inicial_projection_concatenates_the_cause_fields() {
        let doc = json!({
            "tipo": { "key": 1, "description": "Petição inicial" },
            "natureza": { "nome_juridico": "Ação de cobrança" },
            "fatos": "contrato inadimplido",
            "preliminares": ["gratuidade de justiça"],
            "pedidos": ["condenação ao pagamento", "juros e correção"],
            "tutela_provisoria": { "detalhes": "bloqueio de valores" }
        });

        let text = project_for_embedding(NATU_DOC_INICIAL, &doc);
        assert!(text.starts_with("Petição inicial: "));
        assert!(text.contains("Natureza Jurídica: Ação de cobrança"));
        assert!(text.contains("Fatos: contrato inadimplido"));
        assert!(text.contains("Pedidos: condenação ao pagamento; juros e correção;"));
        assert!(text.contains("Tutela Provisória: bloqueio de valores"));
    }

    #[test]
    fn defesa_projection_covers_contestacao_and_replica() {
        let doc = json!({
            "tipo": { "key": 2, "description": "Contestação" },
            "fatos": "nega o inadimplemento",
            "teses": ["prescrição"],
            "pedidos": ["improcedência"]
        });

        let text = project_for_embedding(NATU_DOC_CONTESTACAO, &doc);
        assert!(text.starts_with("Contestação: "));
        assert!(text.contains("Teses: prescrição;"));
    }

    #[test]
    fn header_falls_back_to_the_table_description() {
        let text = project_for_embedding(NATU_DOC_REPLICA, &json!({ "fatos": "impugna a defesa" }));
        assert!(text.starts_with("Réplica: "));
    }

    #[test]
    fn unknown_families_fall_back_to_the_raw_json() {
        let doc = json!({ "dispositivo": "julgo procedente" });
        let text = project_for_embedding(8, &doc);
        assert_eq!(text, doc.to_string());
    }

    #[test]
    fn empty_fields_still_name_the_family() {
        let doc = json!({});
        let text = project_for_embedding(NATU_DOC_PETICAO, &doc);
        assert!(text.starts_with("Petição"));
    }
}
