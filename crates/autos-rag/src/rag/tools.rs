//! Registry of case-document retrieval tools
//!
//! Each tool fetches the newest persisted document of one natureza for the
//! active case context, returning its structured text. Tools take no
//! arguments; the context comes from the conversation being answered.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::natureza::{
    NATU_DOC_CONTESTACAO, NATU_DOC_DECISAO, NATU_DOC_DESP_INI, NATU_DOC_DESP_ORD,
    NATU_DOC_EMBARGOS, NATU_DOC_INICIAL, NATU_DOC_PETICAO, NATU_DOC_REPLICA, NATU_DOC_SENTENCA,
};
use crate::storage::Database;
use crate::types::llm::ToolSpec;

type ToolHandler = Box<dyn Fn(&Database, i64) -> Result<String> + Send + Sync>;

struct RegisteredTool {
    spec: ToolSpec,
    handler: ToolHandler,
}

/// Named retrieval tools, dispatched by the orchestrator
pub struct ToolRegistry {
    store: Arc<Database>,
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new(store: Arc<Database>) -> Self {
        Self {
            store,
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool under a unique name
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        handler: impl Fn(&Database, i64) -> Result<String> + Send + Sync + 'static,
    ) {
        self.tools.insert(
            name.to_string(),
            RegisteredTool {
                spec: ToolSpec {
                    name: name.to_string(),
                    description: description.to_string(),
                    parameters: serde_json::json!({
                        "type": "object",
                        "properties": {},
                        "required": [],
                    }),
                },
                handler: Box::new(handler),
            },
        );
    }

    /// Registry with one retrieval tool per extractable document family
    pub fn for_case_documents(store: Arc<Database>) -> Self {
        let mut registry = Self::new(store);

        let families: &[(&str, &str, i32)] = &[
            (
                "get_peticao_inicial",
                "Retorna as principais informações da petição inicial do processo",
                NATU_DOC_INICIAL,
            ),
            (
                "get_contestacao",
                "Retorna as principais informações das contestações apresentadas no processo",
                NATU_DOC_CONTESTACAO,
            ),
            (
                "get_replica",
                "Retorna as principais informações das réplicas apresentadas no processo",
                NATU_DOC_REPLICA,
            ),
            (
                "get_despacho_inicial",
                "Retorna as principais informações do despacho inicial proferido no processo",
                NATU_DOC_DESP_INI,
            ),
            (
                "get_despacho_ordinatorio",
                "Retorna as principais informações dos despachos ordinatórios proferidos no processo",
                NATU_DOC_DESP_ORD,
            ),
            (
                "get_peticao_diversa",
                "Retorna as principais informações das petições diversas apresentadas no processo",
                NATU_DOC_PETICAO,
            ),
            (
                "get_decisao_interlocutoria",
                "Retorna as principais informações da decisão interlocutória mais recente do processo",
                NATU_DOC_DECISAO,
            ),
            (
                "get_embargos_declaracao",
                "Retorna as principais informações dos embargos de declaração interpostos no processo",
                NATU_DOC_EMBARGOS,
            ),
            (
                "get_sentenca",
                "Retorna as principais informações das sentenças proferidas no processo",
                NATU_DOC_SENTENCA,
            ),
        ];

        for &(name, description, natureza) in families {
            registry.register(name, description, move |store, context_id| {
                fetch_document(store, context_id, natureza)
            });
        }

        registry
    }

    /// Tool declarations for the first LLM call
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|tool| tool.spec.clone()).collect()
    }

    /// Execute a tool by name for the active context.
    ///
    /// Unknown names are an error for this call only; the orchestrator
    /// forwards the error payload and proceeds.
    pub fn dispatch(&self, name: &str, context_id: i64) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::not_found(format!("unknown tool {:?}", name)))?;
        (tool.handler)(&self.store, context_id)
    }
}

/// Newest document of the natureza within the context, structured text
/// preferred over the raw body.
fn fetch_document(store: &Database, context_id: i64, natureza: i32) -> Result<String> {
    let document = store
        .first_document_by_natureza(context_id, natureza)?
        .ok_or_else(|| Error::not_found("nenhum documento encontrado"))?;

    Ok(match document.structured_json {
        Some(json) => json.to_string(),
        None => document.raw_text,
    })
}
