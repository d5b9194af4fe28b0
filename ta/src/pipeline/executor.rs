//! Pipeline - runs the steps in order and enforces their declared contracts

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::steps::{LlmStep, LoadPreferences, SavePreferences, ValidateInput};
use super::{PipelineError, StateField, Step, StepContext, TripState};

/// Progress notifications emitted while a pipeline runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    Started {
        name: &'static str,
        index: usize,
        total: usize,
    },
    Finished {
        name: &'static str,
        index: usize,
        total: usize,
        elapsed: Duration,
    },
}

/// An ordered, validated chain of steps
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    /// Build a pipeline, checking that every read is produced by the input or
    /// an earlier step and that no field has two writers
    pub fn new(steps: Vec<Box<dyn Step>>) -> Result<Self, PipelineError> {
        debug!(step_count = %steps.len(), "Pipeline::new: called");
        let mut writers: HashMap<StateField, &'static str> = StateField::INPUTS
            .iter()
            .filter(|f| !f.is_append_only())
            .map(|f| (*f, "input"))
            .collect();
        let mut available: Vec<StateField> = StateField::INPUTS.to_vec();

        for step in &steps {
            for field in step.reads() {
                if !available.contains(field) {
                    return Err(PipelineError::OrderViolation {
                        step: step.name().to_string(),
                        field: *field,
                    });
                }
            }
            for field in step.writes() {
                if field.is_append_only() {
                    continue;
                }
                if let Some(first) = writers.insert(*field, step.name()) {
                    return Err(PipelineError::DuplicateWriter {
                        field: *field,
                        first: first.to_string(),
                        second: step.name().to_string(),
                    });
                }
                available.push(*field);
            }
        }

        Ok(Self { steps })
    }

    /// load_preferences → validate_input → research_destination →
    /// plan_itinerary → suggest_accommodations → recommend_activities →
    /// compile_final_plan → save_preferences
    pub fn travel() -> Result<Self, PipelineError> {
        Self::new(vec![
            Box::new(LoadPreferences),
            Box::new(ValidateInput),
            Box::new(LlmStep::research_destination()),
            Box::new(LlmStep::plan_itinerary()),
            Box::new(LlmStep::suggest_accommodations()),
            Box::new(LlmStep::recommend_activities()),
            Box::new(LlmStep::compile_final_plan()),
            Box::new(SavePreferences),
        ])
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order and return the final state
    pub async fn run(&self, state: TripState, ctx: &StepContext) -> Result<TripState, PipelineError> {
        self.run_observed(state, ctx, |_| {}).await
    }

    /// Like [`Pipeline::run`], reporting each step's start and finish
    pub async fn run_observed(
        &self,
        mut state: TripState,
        ctx: &StepContext,
        mut observer: impl FnMut(StepEvent) + Send,
    ) -> Result<TripState, PipelineError> {
        let total = self.steps.len();
        info!(destination = %state.destination, steps = %total, "Pipeline starting");

        for (index, step) in self.steps.iter().enumerate() {
            let name = step.name();
            observer(StepEvent::Started { name, index, total });
            check_outputs_empty(step.as_ref(), &state)?;

            let started = Instant::now();
            let before = state.clone();
            state = step.run(state, ctx).await?;
            check_step_contract(step.as_ref(), &before, &state)?;

            let elapsed = started.elapsed();
            debug!(step = %name, elapsed_ms = %elapsed.as_millis(), "run_observed: step finished");
            observer(StepEvent::Finished {
                name,
                index,
                total,
                elapsed,
            });
        }

        info!(usage = ?ctx.usage(), "Pipeline finished");
        Ok(state)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("steps", &self.step_names()).finish()
    }
}

fn check_outputs_empty(step: &dyn Step, state: &TripState) -> Result<(), PipelineError> {
    for field in step.writes().iter().filter(|f| !f.is_append_only()) {
        if state.is_written(*field) {
            return Err(PipelineError::AlreadyWritten {
                step: step.name().to_string(),
                field: *field,
            });
        }
    }
    Ok(())
}

fn check_step_contract(step: &dyn Step, before: &TripState, after: &TripState) -> Result<(), PipelineError> {
    let name = step.name();
    let writes = step.writes();

    for field in writes.iter().filter(|f| !f.is_append_only()) {
        if !after.is_written(*field) {
            return Err(PipelineError::MissingOutput {
                step: name.to_string(),
                field: *field,
            });
        }
    }

    if !after.messages.starts_with(&before.messages) {
        return Err(PipelineError::MessagesRewritten { step: name.to_string() });
    }

    for field in StateField::INPUTS.iter().chain(StateField::OUTPUTS.iter()) {
        if !writes.contains(field) && !before.same_field(after, *field) {
            return Err(PipelineError::UndeclaredWrite {
                step: name.to_string(),
                field: *field,
            });
        }
    }
    Ok(())
}
