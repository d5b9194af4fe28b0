//! Stateful step pipeline
//!
//! A [`TripState`] is threaded through a fixed chain of [`Step`]s. Each step
//! declares the fields it reads and writes; the [`Pipeline`] checks the chain
//! when it is built and checks every step again as it runs.
//!
//! ```text
//! load_preferences → validate_input → research_destination* → plan_itinerary
//!   → suggest_accommodations* → recommend_activities* → compile_final_plan
//!   → save_preferences                               (* may call tools)
//! ```

mod error;
mod executor;
mod resolver;
mod state;
mod step;
mod steps;

pub use error::PipelineError;
pub use executor::{Pipeline, StepEvent};
pub use resolver::{Resolution, ToolLoop};
pub use state::{StateField, TripState};
pub use step::{RunUsage, Step, StepContext, StepSettings};
pub use steps::{LlmStep, LoadPreferences, NO_SAVED_PREFERENCES, SavePreferences, ValidateInput};
