//! Tool error types

use thiserror::Error;

/// Errors that can occur during tool execution
///
/// None of these abort a run: the registry turns them into error results
/// the model sees as text.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{tool} is not configured: {reason}")]
    NotConfigured { tool: String, reason: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{service} API error {status}: {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_message() {
        let err = ToolError::NotConfigured {
            tool: "web_search".to_string(),
            reason: "TAVILY_API_KEY is not set".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("web_search"));
        assert!(msg.contains("TAVILY_API_KEY"));
    }

    #[test]
    fn test_api_error_message() {
        let err = ToolError::Api {
            service: "Tavily".to_string(),
            status: 401,
            message: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "Tavily API error 401: bad key");
    }
}
