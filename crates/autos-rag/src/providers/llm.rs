//! LLM provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::llm::{CompletionRequest, Embedding, LlmResponse};

/// Trait for the completion/embedding service.
///
/// Implementations:
/// - `OpenAiClient`: Responses-style HTTP API
/// - `fake::FakeLlm`: scripted responses for tests
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Submit a completion request and return the parsed response.
    ///
    /// The request may carry tool declarations, tool-call outputs and a
    /// previous-response id for multi-turn continuation.
    async fn submit(&self, request: CompletionRequest) -> Result<LlmResponse>;

    /// Compute the embedding vector for a text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
pub mod fake {
    //! Scripted LLM for tests

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    use crate::error::{Error, Result};
    use crate::types::llm::{
        CompletionRequest, Embedding, LlmResponse, OutputItem, TokenUsage,
    };

    use super::LlmProvider;

    /// Returns queued responses in order; repeats the last one when the
    /// queue runs dry. Records every request it receives.
    pub struct FakeLlm {
        responses: Mutex<VecDeque<LlmResponse>>,
        last: Mutex<Option<LlmResponse>>,
        pub requests: Mutex<Vec<CompletionRequest>>,
        embed_dimensions: usize,
        embed_usage: TokenUsage,
    }

    impl FakeLlm {
        pub fn with_responses(responses: Vec<LlmResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                last: Mutex::new(None),
                requests: Mutex::new(Vec::new()),
                embed_dimensions: 8,
                embed_usage: TokenUsage::new(3, 0),
            }
        }

        /// Single text response
        pub fn with_text(text: &str) -> Self {
            Self::with_responses(vec![text_response("resp_fake", text, TokenUsage::default())])
        }

        /// Override the usage on every queued response
        pub fn usage(self, usage: TokenUsage) -> Self {
            {
                let mut responses = self.responses.lock();
                for response in responses.iter_mut() {
                    response.usage = usage;
                }
            }
            self
        }

        pub fn embed_dimensions(mut self, dimensions: usize) -> Self {
            self.embed_dimensions = dimensions;
            self
        }

        /// Requests seen so far
        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    /// Build a plain text response
    pub fn text_response(id: &str, text: &str, usage: TokenUsage) -> LlmResponse {
        LlmResponse {
            id: id.to_string(),
            output: vec![OutputItem::Message {
                text: text.to_string(),
            }],
            usage,
        }
    }

    /// Build a response made of function calls
    pub fn tool_call_response(id: &str, calls: &[(&str, &str)], usage: TokenUsage) -> LlmResponse {
        LlmResponse {
            id: id.to_string(),
            output: calls
                .iter()
                .map(|(name, call_id)| OutputItem::FunctionCall {
                    name: name.to_string(),
                    call_id: call_id.to_string(),
                    arguments: "{}".to_string(),
                })
                .collect(),
            usage,
        }
    }

    #[async_trait]
    impl LlmProvider for FakeLlm {
        async fn submit(&self, request: CompletionRequest) -> Result<LlmResponse> {
            self.requests.lock().push(request);
            let mut responses = self.responses.lock();
            match responses.pop_front() {
                Some(response) => {
                    *self.last.lock() = Some(response.clone());
                    Ok(response)
                }
                None => self
                    .last
                    .lock()
                    .clone()
                    .ok_or_else(|| Error::llm("fake has no scripted response")),
            }
        }

        async fn embed(&self, text: &str) -> Result<Embedding> {
            // Deterministic vector derived from the text length
            let seed = (text.len() % 97) as f32 / 97.0;
            Ok(Embedding {
                vector: (0..self.embed_dimensions)
                    .map(|i| seed + i as f32 * 0.01)
                    .collect(),
                usage: self.embed_usage,
            })
        }

        fn name(&self) -> &str {
            "fake"
        }
    }
}
