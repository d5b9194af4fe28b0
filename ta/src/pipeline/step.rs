//! Step trait and the context every step receives

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prefstore::PreferenceStore;
use tracing::warn;

use super::{PipelineError, StateField, TripState};
use crate::config::Config;
use crate::llm::{LlmClient, TokenUsage};
use crate::prompts::PromptLoader;
use crate::tools::ToolRegistry;

/// One named stage of the pipeline
///
/// `reads` and `writes` are checked by the executor: reads must be produced
/// earlier, and only declared fields may change.
#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    fn reads(&self) -> &'static [StateField];

    fn writes(&self) -> &'static [StateField];

    async fn run(&self, state: TripState, ctx: &StepContext) -> Result<TripState, PipelineError>;
}

/// Knobs the steps and the tool loop read
#[derive(Debug, Clone, PartialEq)]
pub struct StepSettings {
    pub max_tool_rounds: u32,
    pub rate_limit_retries: u32,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Load and save preference memory
    pub remember: bool,
}

impl StepSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_tool_rounds: config.pipeline.max_tool_rounds,
            rate_limit_retries: config.pipeline.rate_limit_retries,
            max_tokens: config.llm.max_tokens,
            temperature: Some(config.llm.temperature),
            remember: config.memory.enabled,
        }
    }
}

impl Default for StepSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Counters accumulated over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunUsage {
    pub llm_calls: u32,
    pub tool_rounds: u32,
    pub tool_calls: u32,
    pub tokens: TokenUsage,
}

/// Shared services for a run
pub struct StepContext {
    pub llm: Arc<dyn LlmClient>,
    pub tools: Arc<ToolRegistry>,
    pub prompts: Arc<PromptLoader>,
    pub store: Arc<PreferenceStore>,
    pub settings: StepSettings,
    usage: Mutex<RunUsage>,
    notices: Mutex<Vec<String>>,
}

impl StepContext {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolRegistry>,
        prompts: Arc<PromptLoader>,
        store: Arc<PreferenceStore>,
    ) -> Self {
        Self {
            llm,
            tools,
            prompts,
            store,
            settings: StepSettings::default(),
            usage: Mutex::new(RunUsage::default()),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn with_settings(mut self, settings: StepSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Usage so far
    pub fn usage(&self) -> RunUsage {
        self.usage.lock().map(|u| *u).unwrap_or_default()
    }

    pub(crate) fn record_usage(&self, llm_calls: u32, tool_rounds: u32, tool_calls: u32, tokens: &TokenUsage) {
        if let Ok(mut usage) = self.usage.lock() {
            usage.llm_calls += llm_calls;
            usage.tool_rounds += tool_rounds;
            usage.tool_calls += tool_calls;
            usage.tokens.add(tokens);
        }
    }

    /// Record a non-fatal problem for the caller to show
    pub fn notice(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "Pipeline notice");
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(message);
        }
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl std::fmt::Debug for StepContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepContext")
            .field("tools", &self.tools)
            .field("store", &self.store)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
