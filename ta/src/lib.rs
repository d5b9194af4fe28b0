//! Travel Agent - LLM-driven trip planning pipeline
//!
//! A trip request flows through a fixed chain of steps. Each step asks the
//! model for one part of the plan (destination research, itinerary, lodging,
//! activities, the compiled plan), letting it call tools along the way.
//! Preferences and past destinations are remembered per user between runs.
//!
//! # Modules
//!
//! - [`pipeline`] - Trip state, steps, the tool loop and the executor
//! - [`llm`] - LLM client trait and Anthropic implementation
//! - [`tools`] - Tool registry, web search and the date helpers
//! - [`prompts`] - Handlebars prompt templates
//! - [`intake`] - Interactive collection of trip details
//! - [`output`] - Saving the finished plan
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod intake;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod tools;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use intake::{Intake, LineReader, TripIntake};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, MockLlmClient, create_client,
};
pub use pipeline::{Pipeline, PipelineError, StepContext, StepEvent, StepSettings, TripState};
pub use prompts::PromptLoader;
pub use tools::{Tool, ToolError, ToolRegistry, ToolResult};
