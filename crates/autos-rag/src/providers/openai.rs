//! HTTP client for the completion/embedding API
//!
//! Speaks the Responses-style wire format: role-tagged input items, optional
//! tool declarations, optional previous-response linkage, and typed output
//! items. Token usage comes back with every call and is surfaced to the
//! caller for ledger accounting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::llm::LlmProvider;
use crate::types::llm::{
    CompletionRequest, Embedding, LlmResponse, OutputItem, TokenUsage,
};

/// Client for the completion/embedding service
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    embed_model: String,
    embedding_dimensions: usize,
    temperature: f32,
    max_output_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            embed_model: config.embed_model.clone(),
            embedding_dimensions: config.embedding_dimensions,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn responses_endpoint(&self) -> String {
        format!("{}/v1/responses", self.base_url)
    }

    fn embeddings_endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

// ---- wire types ----

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    input: Vec<ApiInputItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiInputItem {
    Message {
        role: String,
        content: Vec<ApiInputContent>,
    },
    FunctionCallOutput {
        call_id: String,
        output: String,
    },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiInputContent {
    InputText { text: String },
}

#[derive(Serialize)]
struct ApiTool {
    #[serde(rename = "type")]
    kind: &'static str,
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct ApiResponse {
    id: String,
    #[serde(default)]
    output: Vec<ApiOutputItem>,
    usage: ApiUsage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiOutputItem {
    Message {
        #[serde(default)]
        content: Vec<ApiOutputContent>,
    },
    FunctionCall {
        name: String,
        call_id: String,
        arguments: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiOutputContent {
    OutputText {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: i64,
    #[serde(default)]
    output_tokens: i64,
}

#[derive(Serialize)]
struct EmbeddingApiRequest {
    model: String,
    input: String,
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingApiItem>,
    usage: EmbeddingApiUsage,
}

#[derive(Deserialize)]
struct EmbeddingApiItem {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingApiUsage {
    #[serde(default)]
    prompt_tokens: i64,
    #[serde(default)]
    total_tokens: i64,
}

fn build_input(request: &CompletionRequest) -> Vec<ApiInputItem> {
    let mut input: Vec<ApiInputItem> = request
        .messages
        .iter()
        .map(|message| ApiInputItem::Message {
            role: match message.role {
                crate::types::llm::Role::Developer => "developer".to_string(),
                crate::types::llm::Role::User => "user".to_string(),
                crate::types::llm::Role::Assistant => "assistant".to_string(),
            },
            content: vec![ApiInputContent::InputText {
                text: message.text.clone(),
            }],
        })
        .collect();

    for output in &request.tool_outputs {
        input.push(ApiInputItem::FunctionCallOutput {
            call_id: output.call_id.clone(),
            output: output.output.clone(),
        });
    }

    input
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn submit(&self, request: CompletionRequest) -> Result<LlmResponse> {
        let body = ApiRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            input: build_input(&request),
            tools: request
                .tools
                .iter()
                .map(|tool| ApiTool {
                    kind: "function",
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                })
                .collect(),
            previous_response_id: request.previous_response_id.clone(),
        };

        let response = self
            .http
            .post(self.responses_endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::llm(format!("completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "completion failed ({}): {}",
                status, body
            )));
        }

        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("failed to parse completion response: {}", e)))?;

        let output = api
            .output
            .into_iter()
            .filter_map(|item| match item {
                ApiOutputItem::Message { content } => {
                    let text = content
                        .into_iter()
                        .filter_map(|c| match c {
                            ApiOutputContent::OutputText { text } => Some(text),
                            ApiOutputContent::Other => None,
                        })
                        .collect::<Vec<_>>()
                        .join("");
                    Some(OutputItem::Message { text })
                }
                ApiOutputItem::FunctionCall {
                    name,
                    call_id,
                    arguments,
                } => Some(OutputItem::FunctionCall {
                    name,
                    call_id,
                    arguments,
                }),
                ApiOutputItem::Other => None,
            })
            .collect();

        let usage = TokenUsage::new(api.usage.input_tokens, api.usage.output_tokens);
        tracing::info!(
            model = %self.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens(),
            "completion call"
        );

        Ok(LlmResponse {
            id: api.id,
            output,
            usage,
        })
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let body = EmbeddingApiRequest {
            model: self.embed_model.clone(),
            input: text.to_string(),
            encoding_format: "float",
        };

        let response = self
            .http
            .post(self.embeddings_endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::llm(format!("embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "embedding failed ({}): {}",
                status, body
            )));
        }

        let api: EmbeddingApiResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("failed to parse embedding response: {}", e)))?;

        let vector = api
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| Error::llm("embedding response has no data"))?;

        if vector.len() != self.embedding_dimensions {
            return Err(Error::llm(format!(
                "embedding has dimension {}, expected {}",
                vector.len(),
                self.embedding_dimensions
            )));
        }

        let usage = TokenUsage::new(
            api.usage.prompt_tokens,
            api.usage.total_tokens - api.usage.prompt_tokens,
        );
        tracing::info!(
            model = %self.embed_model,
            prompt_tokens = usage.prompt_tokens,
            total_tokens = usage.total_tokens(),
            "embedding call"
        );

        Ok(Embedding { vector, usage })
    }

    fn name(&self) -> &str {
        "openai"
    }
}
