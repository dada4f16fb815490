//! Two-phase tool-calling orchestration
//!
//! First call: conversation plus the registered tool declarations. If the
//! model requests retrievals, each one is executed and the conversation is
//! resubmitted with the outputs attached by call id and the declarations
//! removed, forcing a final consolidated answer. Zero tool calls means the
//! first response already is the answer.

use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::providers::llm::LlmProvider;
use crate::rag::tools::ToolRegistry;
use crate::storage::Database;
use crate::types::llm::{ChatMessage, CompletionRequest, ToolOutput};

/// Final answer with the retrievals that produced it
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub text: String,
    pub response_id: String,
    /// Names of the tools the model called, in request order
    pub tool_calls: Vec<String>,
}

/// Runs the two-phase protocol for one case context
pub struct RagOrchestrator {
    store: Arc<Database>,
    llm: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
}

impl RagOrchestrator {
    pub fn new(store: Arc<Database>, llm: Arc<dyn LlmProvider>, tools: ToolRegistry) -> Self {
        Self { store, llm, tools }
    }

    /// Answer a question over the context's persisted documents
    pub async fn answer(&self, context_id: i64, question: &str) -> Result<RagAnswer> {
        let request = CompletionRequest {
            messages: vec![ChatMessage::user(question)],
            tools: self.tools.specs(),
            ..Default::default()
        };

        let first = self.llm.submit(request).await?;
        self.store.add_token_usage(context_id, first.usage)?;

        let calls = first.function_calls();
        if calls.is_empty() {
            // No retrievals requested; the first response is final
            return Ok(RagAnswer {
                text: first.output_text(),
                response_id: first.id,
                tool_calls: Vec::new(),
            });
        }

        let mut tool_calls = Vec::with_capacity(calls.len());
        let mut tool_outputs = Vec::with_capacity(calls.len());
        for (name, call_id, _arguments) in calls {
            tool_calls.push(name.to_string());
            let output = match self.tools.dispatch(name, context_id) {
                Ok(output) => output,
                Err(e) => {
                    // A failed retrieval becomes an error payload for that
                    // call; the final answer still proceeds
                    tracing::warn!(tool = name, error = %e, "tool call failed");
                    e.to_string()
                }
            };
            tool_outputs.push(ToolOutput {
                call_id: call_id.to_string(),
                output,
            });
        }

        // Tool outputs attached, declarations removed: the model must
        // consolidate now
        let request = CompletionRequest {
            tool_outputs,
            previous_response_id: Some(first.id),
            ..Default::default()
        };

        let second = self.llm.submit(request).await?;
        self.store.add_token_usage(context_id, second.usage)?;

        Ok(RagAnswer {
            text: second.output_text(),
            response_id: second.id,
            tool_calls,
        })
    }
}
