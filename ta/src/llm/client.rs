//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// The whole conversation travels with every request; the pipeline owns the
/// history and the client keeps nothing between calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Scripted client for tests and dry runs
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tracing::debug;

    /// Replays a fixed script of responses and records every request it sees
    #[derive(Default)]
    pub struct MockLlmClient {
        script: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            debug!(response_count = %responses.len(), "MockLlmClient::new: called");
            Self::scripted(responses.into_iter().map(Ok).collect())
        }

        /// Script that can interleave errors (e.g. rate limits) with responses
        pub fn scripted(script: Vec<Result<CompletionResponse, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue one more response at the end of the script
        pub fn push(&self, response: CompletionResponse) {
            if let Ok(mut script) = self.script.lock() {
                script.push_back(Ok(response));
            }
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().map(|r| r.len()).unwrap_or(0)
        }

        /// Every request received so far, in call order
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }

        pub fn remaining(&self) -> usize {
            self.script.lock().map(|s| s.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!(messages = %request.messages.len(), "MockLlmClient::complete: called");
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }
            let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
            next.unwrap_or_else(|| {
                debug!("MockLlmClient::complete: no more mock responses");
                Err(LlmError::InvalidResponse("No more mock responses".to_string()))
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::time::Duration;

        fn req() -> CompletionRequest {
            CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![],
                tools: vec![],
                max_tokens: 1000,
                temperature: None,
            }
        }

        #[tokio::test]
        async fn test_mock_client_returns_responses() {
            let client = MockLlmClient::new(vec![
                CompletionResponse::text("Response 1"),
                CompletionResponse::text("Response 2"),
            ]);

            let resp1 = client.complete(req()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(req()).await.unwrap();
            assert_eq!(resp2.content, Some("Response 2".to_string()));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.remaining(), 0);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            assert!(client.complete(req()).await.is_err());
            assert_eq!(client.call_count(), 1);
        }

        #[tokio::test]
        async fn test_mock_client_replays_errors() {
            let client = MockLlmClient::scripted(vec![
                Err(LlmError::RateLimited {
                    retry_after: Duration::from_millis(1),
                }),
                Ok(CompletionResponse::text("after")),
            ]);

            assert!(client.complete(req()).await.unwrap_err().is_rate_limit());
            assert_eq!(client.complete(req()).await.unwrap().content.as_deref(), Some("after"));
        }
    }
}
