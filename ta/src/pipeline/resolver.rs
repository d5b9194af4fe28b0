//! Tool-call resolution loop
//!
//! Ask the model; if it wants tools, run them, append the exchange and ask
//! again, until it answers in text or the round cap is hit.

use tracing::{debug, info, warn};

use super::{PipelineError, StepSettings};
use crate::llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmClient, Message, StopReason, TokenUsage, ToolDefinition,
};
use crate::tools::{ToolRegistry, ToolResult};

/// Outcome of a resolved conversation
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The model's final text, unchanged
    pub text: String,
    /// Conversation including every tool exchange, ending before the final answer
    pub transcript: Vec<Message>,
    pub llm_calls: u32,
    pub tool_rounds: u32,
    pub tool_calls: u32,
    pub usage: TokenUsage,
}

pub struct ToolLoop<'a> {
    llm: &'a dyn LlmClient,
    tools: &'a ToolRegistry,
    settings: &'a StepSettings,
}

impl<'a> ToolLoop<'a> {
    pub fn new(llm: &'a dyn LlmClient, tools: &'a ToolRegistry, settings: &'a StepSettings) -> Self {
        Self { llm, tools, settings }
    }

    /// Drive the conversation to a final text answer
    ///
    /// With an empty `tool_defs` this is a single plain completion.
    pub async fn resolve(
        &self,
        system_prompt: &str,
        conversation: Vec<Message>,
        tool_defs: &[ToolDefinition],
    ) -> Result<Resolution, PipelineError> {
        debug!(messages = %conversation.len(), tools = %tool_defs.len(), max_rounds = %self.settings.max_tool_rounds, "resolve: called");
        let mut messages = conversation;
        let mut llm_calls = 0;
        let mut tool_rounds = 0;
        let mut tool_calls = 0;
        let mut usage = TokenUsage::default();

        loop {
            let request = CompletionRequest {
                system_prompt: system_prompt.to_string(),
                messages: messages.clone(),
                tools: tool_defs.to_vec(),
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            };

            let response = self.complete_with_retry(request).await?;
            llm_calls += 1;
            usage.add(&response.usage);

            if !response.has_tool_calls() {
                if response.stop_reason == StopReason::MaxTokens {
                    warn!("Model response was truncated at max tokens");
                }
                debug!(%llm_calls, %tool_rounds, "resolve: final answer");
                return Ok(Resolution {
                    text: response.content.unwrap_or_default(),
                    transcript: messages,
                    llm_calls,
                    tool_rounds,
                    tool_calls,
                    usage,
                });
            }

            if tool_rounds >= self.settings.max_tool_rounds {
                warn!(rounds = %tool_rounds, "Model still requesting tools after the last permitted round");
                return Err(PipelineError::ToolLoopExceeded { rounds: tool_rounds });
            }
            tool_rounds += 1;
            tool_calls += response.tool_calls.len() as u32;

            let names: Vec<&str> = response.tool_calls.iter().map(|c| c.name.as_str()).collect();
            info!(round = %tool_rounds, tools = ?names, "Running requested tools");

            let results = self.tools.execute_all(&response.tool_calls).await;
            messages.push(build_assistant_message(&response));
            messages.push(build_tool_result_message(&results));
        }
    }

    /// One LLM call, retrying rate limits after the advertised delay
    async fn complete_with_retry(&self, request: CompletionRequest) -> Result<CompletionResponse, PipelineError> {
        let mut retries = 0;
        loop {
            match self.llm.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_rate_limit() && retries < self.settings.rate_limit_retries => {
                    retries += 1;
                    let delay = e.retry_after().unwrap_or_default();
                    warn!(attempt = %retries, delay_ms = %delay.as_millis(), "LLM rate limited, waiting before retry");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    debug!(error = %e, "complete_with_retry: giving up");
                    return Err(e.into());
                }
            }
        }
    }
}

/// The model's tool-requesting turn, text first then tool_use blocks in order
fn build_assistant_message(response: &CompletionResponse) -> Message {
    let mut blocks = Vec::new();

    if let Some(text) = response.content.as_ref().filter(|t| !t.is_empty()) {
        blocks.push(ContentBlock::text(text));
    }

    for call in &response.tool_calls {
        blocks.push(ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.input.clone(),
        });
    }

    Message::assistant_blocks(blocks)
}

/// All results of one round, in request order, as a single user turn
fn build_tool_result_message(results: &[(String, ToolResult)]) -> Message {
    let blocks = results
        .iter()
        .map(|(id, result)| ContentBlock::tool_result(id, &result.content, result.is_error))
        .collect();

    Message::user_blocks(blocks)
}
