//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::ToolError;

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches LLM tool_use name)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    ///
    /// Bad input the model can correct should come back as an error
    /// `ToolResult`; `Err` is for failures of the tool itself.
    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError>;
}

/// Result of a tool execution, fed back to the model as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        debug!("ToolResult::success: called");
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(content: impl Into<String>) -> Self {
        debug!("ToolResult::error: called");
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Pull a required string argument out of a tool input object
pub(crate) fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArgument(format!("{} is required", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("10 days");
        assert!(!result.is_error);
        assert_eq!(result.content, "10 days");
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("Tool 'nope' not found");
        assert!(result.is_error);
        assert_eq!(result.content, "Tool 'nope' not found");
    }

    #[test]
    fn test_required_str() {
        let input = serde_json::json!({ "month": "July", "n": 3 });
        assert_eq!(required_str(&input, "month").unwrap(), "July");
        assert!(required_str(&input, "n").is_err());
        assert!(required_str(&input, "missing").is_err());
    }
}
