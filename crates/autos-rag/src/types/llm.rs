//! Request and response types for the LLM completion/embedding service

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    User,
    Assistant,
}

/// A role-tagged text message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn developer(text: impl Into<String>) -> Self {
        Self {
            role: Role::Developer,
            text: text.into(),
        }
    }
}

/// A named tool the model may call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool arguments
    pub parameters: serde_json::Value,
}

/// Output of one executed tool call, fed back tagged by its call id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub call_id: String,
    pub output: String,
}

/// One completion request to the LLM service
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Tool declarations offered to the model
    pub tools: Vec<ToolSpec>,
    /// Outputs of previously requested tool calls
    pub tool_outputs: Vec<ToolOutput>,
    /// Links this call to a previous response for multi-turn continuation
    pub previous_response_id: Option<String>,
}

impl CompletionRequest {
    /// Build a plain request from messages
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

/// One output item of a completion response.
///
/// Modeled as a tagged variant so missing-case handling is a compile-time
/// concern rather than a string comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    /// Generated text
    Message { text: String },
    /// Model-initiated tool call
    FunctionCall {
        name: String,
        call_id: String,
        arguments: String,
    },
}

/// Token usage counters reported by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: i64, completion_tokens: i64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total_tokens(&self) -> i64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Response from one completion call
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Response id, usable as `previous_response_id` on the next call
    pub id: String,
    /// Output items in model order
    pub output: Vec<OutputItem>,
    /// Token usage for this call
    pub usage: TokenUsage,
}

impl LlmResponse {
    /// Concatenated text of all message items
    pub fn output_text(&self) -> String {
        let mut text = String::new();
        for item in &self.output {
            if let OutputItem::Message { text: t } = item {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(t);
            }
        }
        text
    }

    /// All function-call items, in model order
    pub fn function_calls(&self) -> Vec<(&str, &str, &str)> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::FunctionCall {
                    name,
                    call_id,
                    arguments,
                } => Some((name.as_str(), call_id.as_str(), arguments.as_str())),
                OutputItem::Message { .. } => None,
            })
            .collect()
    }
}

/// An embedding vector plus the usage its computation cost
#[derive(Debug, Clone)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub usage: TokenUsage,
}
