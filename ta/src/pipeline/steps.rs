//! The travel planning steps

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::resolver::ToolLoop;
use super::{PipelineError, StateField, Step, StepContext, TripState};
use crate::llm::Message;
use crate::tools::builtin::trip_days;
use prefstore::SaveOutcome;

use StateField::*;

/// Summary used when nothing is remembered for this traveler
pub const NO_SAVED_PREFERENCES: &str = "No saved preferences.";

/// Read the traveler's remembered preferences into `saved_preferences`
pub struct LoadPreferences;

#[async_trait]
impl Step for LoadPreferences {
    fn name(&self) -> &'static str {
        "load_preferences"
    }

    fn reads(&self) -> &'static [StateField] {
        &[UserId]
    }

    fn writes(&self) -> &'static [StateField] {
        &[SavedPreferences]
    }

    async fn run(&self, mut state: TripState, ctx: &StepContext) -> Result<TripState, PipelineError> {
        let user_id = state.user_id.trim().to_string();
        debug!(%user_id, remember = %ctx.settings.remember, "LoadPreferences::run: called");

        let record = if ctx.settings.remember && !user_id.is_empty() {
            let store = Arc::clone(&ctx.store);
            let loaded = tokio::task::spawn_blocking(move || store.try_load(&user_id))
                .await
                .map_err(|e| e.to_string())
                .and_then(|r| r.map_err(|e| e.to_string()));
            match loaded {
                Ok(record) => record,
                Err(reason) => {
                    ctx.notice(format!("Could not load saved preferences: {}", reason));
                    None
                }
            }
        } else {
            None
        };

        let summary = match record {
            Some(record) => {
                info!(destinations = record.past_destinations.len(), "Loaded saved preferences");
                record.summary()
            }
            None => NO_SAVED_PREFERENCES.to_string(),
        };
        state.set_output(SavedPreferences, summary);
        Ok(state)
    }
}

/// Check the required trip details and append the summary turn
pub struct ValidateInput;

#[async_trait]
impl Step for ValidateInput {
    fn name(&self) -> &'static str {
        "validate_input"
    }

    fn reads(&self) -> &'static [StateField] {
        &[Source, Destination, StartDate, EndDate, Preferences, Hobbies, Messages]
    }

    fn writes(&self) -> &'static [StateField] {
        &[Messages]
    }

    async fn run(&self, mut state: TripState, ctx: &StepContext) -> Result<TripState, PipelineError> {
        debug!(destination = %state.destination, "ValidateInput::run: called");
        let missing: Vec<&str> = [
            (Source, &state.source),
            (Destination, &state.destination),
            (StartDate, &state.start_date),
            (EndDate, &state.end_date),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field.name())
        .collect();

        if !missing.is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        match trip_days(&state.start_date, &state.end_date) {
            None => warn!(start = %state.start_date, end = %state.end_date, "Trip dates are not YYYY-MM-DD"),
            Some(days) if days < 1 => warn!(%days, "Trip ends before it starts"),
            Some(_) => {}
        }

        let summary = ctx
            .prompts
            .render("travel-details", &state)
            .map_err(|e| PipelineError::Prompt(e.to_string()))?;
        state.messages.push(Message::user(summary));
        Ok(state)
    }
}

/// Template variables: the state plus whether anything was remembered
#[derive(Serialize)]
struct PromptVars<'a> {
    #[serde(flatten)]
    state: &'a TripState,
    remembered: bool,
}

/// A step that asks the model for one output field
pub struct LlmStep {
    name: &'static str,
    reads: &'static [StateField],
    writes: &'static [StateField],
    output: StateField,
    template: &'static str,
    use_tools: bool,
    append_turn: bool,
}

impl LlmStep {
    pub fn research_destination() -> Self {
        Self {
            name: "research_destination",
            reads: &[Source, Destination, StartDate, EndDate, Preferences, Hobbies, SavedPreferences],
            writes: &[DestinationInfo],
            output: DestinationInfo,
            template: "research-destination",
            use_tools: true,
            append_turn: false,
        }
    }

    pub fn plan_itinerary() -> Self {
        Self {
            name: "plan_itinerary",
            reads: &[Destination, StartDate, EndDate, Preferences, Hobbies, DestinationInfo],
            writes: &[Itinerary],
            output: Itinerary,
            template: "plan-itinerary",
            use_tools: false,
            append_turn: false,
        }
    }

    pub fn suggest_accommodations() -> Self {
        Self {
            name: "suggest_accommodations",
            reads: &[Destination, StartDate, EndDate, Preferences, Itinerary],
            writes: &[Accommodations],
            output: Accommodations,
            template: "suggest-accommodations",
            use_tools: true,
            append_turn: false,
        }
    }

    pub fn recommend_activities() -> Self {
        Self {
            name: "recommend_activities",
            reads: &[Destination, StartDate, EndDate, Preferences, Hobbies, SavedPreferences, Itinerary],
            writes: &[Activities],
            output: Activities,
            template: "recommend-activities",
            use_tools: true,
            append_turn: false,
        }
    }

    pub fn compile_final_plan() -> Self {
        Self {
            name: "compile_final_plan",
            reads: &[
                Source,
                Destination,
                StartDate,
                EndDate,
                DestinationInfo,
                Itinerary,
                Accommodations,
                Activities,
                Messages,
            ],
            writes: &[FinalPlan, Messages],
            output: FinalPlan,
            template: "compile-final-plan",
            use_tools: false,
            append_turn: true,
        }
    }

    pub fn uses_tools(&self) -> bool {
        self.use_tools
    }

    fn render(&self, ctx: &StepContext, part: &str, vars: &PromptVars<'_>) -> Result<String, PipelineError> {
        ctx.prompts
            .render(&format!("{}-{}", self.template, part), vars)
            .map_err(|e| PipelineError::Prompt(e.to_string()))
    }
}

#[async_trait]
impl Step for LlmStep {
    fn name(&self) -> &'static str {
        self.name
    }

    fn reads(&self) -> &'static [StateField] {
        self.reads
    }

    fn writes(&self) -> &'static [StateField] {
        self.writes
    }

    async fn run(&self, mut state: TripState, ctx: &StepContext) -> Result<TripState, PipelineError> {
        debug!(step = %self.name, use_tools = %self.use_tools, "LlmStep::run: called");
        let remembered = state
            .saved_preferences
            .as_deref()
            .is_some_and(|s| s != NO_SAVED_PREFERENCES);
        let vars = PromptVars {
            state: &state,
            remembered,
        };
        let system_prompt = self.render(ctx, "system", &vars)?;
        let user_prompt = self.render(ctx, "user", &vars)?;

        let tool_defs = if self.use_tools { ctx.tools.definitions() } else { Vec::new() };
        let resolution = ToolLoop::new(ctx.llm.as_ref(), &ctx.tools, &ctx.settings)
            .resolve(&system_prompt, vec![Message::user(user_prompt)], &tool_defs)
            .await?;
        ctx.record_usage(
            resolution.llm_calls,
            resolution.tool_rounds,
            resolution.tool_calls,
            &resolution.usage,
        );
        info!(
            step = %self.name,
            llm_calls = resolution.llm_calls,
            tool_rounds = resolution.tool_rounds,
            chars = resolution.text.len(),
            "Step produced output"
        );

        if self.append_turn {
            state.messages.push(Message::assistant(resolution.text.clone()));
        }
        state.set_output(self.output, resolution.text);
        Ok(state)
    }
}

/// Fold this trip into the traveler's memory; never fails the run
pub struct SavePreferences;

#[async_trait]
impl Step for SavePreferences {
    fn name(&self) -> &'static str {
        "save_preferences"
    }

    fn reads(&self) -> &'static [StateField] {
        &[UserId, Preferences, Hobbies, Destination, FinalPlan]
    }

    fn writes(&self) -> &'static [StateField] {
        &[]
    }

    async fn run(&self, state: TripState, ctx: &StepContext) -> Result<TripState, PipelineError> {
        let user_id = state.user_id.trim().to_string();
        debug!(%user_id, remember = %ctx.settings.remember, "SavePreferences::run: called");
        if !ctx.settings.remember || user_id.is_empty() {
            debug!("SavePreferences::run: memory off or anonymous, skipping");
            return Ok(state);
        }

        let store = Arc::clone(&ctx.store);
        let (preferences, hobbies, destination) =
            (state.preferences.clone(), state.hobbies.clone(), state.destination.clone());
        let outcome =
            tokio::task::spawn_blocking(move || store.remember(&user_id, &preferences, &hobbies, &destination)).await;

        match outcome {
            Ok(SaveOutcome::Saved) => info!("Preferences saved"),
            Ok(SaveOutcome::Skipped) => debug!("SavePreferences::run: store skipped save"),
            Ok(SaveOutcome::Failed(reason)) => ctx.notice(format!("Could not save preferences: {}", reason)),
            Err(e) => ctx.notice(format!("Could not save preferences: {}", e)),
        }
        Ok(state)
    }
}
