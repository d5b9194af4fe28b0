//! Pipeline error types

use thiserror::Error;

use super::StateField;
use crate::llm::LlmError;

/// Errors that abort a pipeline run
///
/// Tool failures and preference store failures never show up here; they are
/// absorbed where they happen.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Model kept requesting tools after {rounds} rounds")]
    ToolLoopExceeded { rounds: u32 },

    #[error("Invalid trip details: {0}")]
    InvalidInput(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Step '{step}' reads '{field}' before any step produces it")]
    OrderViolation { step: String, field: StateField },

    #[error("Field '{field}' is written by both '{first}' and '{second}'")]
    DuplicateWriter {
        field: StateField,
        first: String,
        second: String,
    },

    #[error("Step '{step}' would overwrite '{field}', which is already set")]
    AlreadyWritten { step: String, field: StateField },

    #[error("Step '{step}' finished without writing '{field}'")]
    MissingOutput { step: String, field: StateField },

    #[error("Step '{step}' changed '{field}', which it does not declare")]
    UndeclaredWrite { step: String, field: StateField },

    #[error("Step '{step}' rewrote earlier messages")]
    MessagesRewritten { step: String },
}

impl PipelineError {
    /// True for errors that come from a mis-assembled pipeline rather than a run
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            PipelineError::OrderViolation { .. }
                | PipelineError::DuplicateWriter { .. }
                | PipelineError::AlreadyWritten { .. }
                | PipelineError::MissingOutput { .. }
                | PipelineError::UndeclaredWrite { .. }
                | PipelineError::MessagesRewritten { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_fields() {
        let err = PipelineError::OrderViolation {
            step: "plan_itinerary".to_string(),
            field: StateField::DestinationInfo,
        };
        assert_eq!(
            err.to_string(),
            "Step 'plan_itinerary' reads 'destination_info' before any step produces it"
        );
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_runtime_errors_are_not_contract_violations() {
        assert!(!PipelineError::ToolLoopExceeded { rounds: 10 }.is_contract_violation());
        assert!(!PipelineError::InvalidInput("source is empty".to_string()).is_contract_violation());
        assert!(
            PipelineError::ToolLoopExceeded { rounds: 3 }
                .to_string()
                .contains("3 rounds")
        );
    }
}
