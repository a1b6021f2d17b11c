//! Mock AI Gateway for testing.
//!
//! Configurable test double for the `AiGateway` port: scripted responses
//! consumed in order, error injection, and call capture for verification.
//!
//! # Example
//!
//! ```ignore
//! let gateway = MockGateway::new()
//!     .with_completion("negative")
//!     .with_error(GatewayError::unavailable("down"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{
    AiGateway, CompletionRequest, CompletionResponse, FinishReason, GatewayError, GatewayInfo,
};

/// Scripted gateway double.
///
/// Responses queue up in configuration order; once the queue is drained a
/// fixed default completion is returned so long-running scripted sessions
/// stay deterministic.
#[derive(Debug, Clone)]
pub struct MockGateway {
    responses: Arc<Mutex<VecDeque<Result<String, GatewayError>>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    fail_always: Option<GatewayError>,
    default_response: String,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Creates a mock with an empty script.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_always: None,
            default_response: "Could you tell me a little more about that?".to_string(),
        }
    }

    /// Creates a mock where every call fails with the given error.
    pub fn failing(error: GatewayError) -> Self {
        Self {
            fail_always: Some(error),
            ..Self::new()
        }
    }

    /// Queues a successful completion.
    pub fn with_completion(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(content.into()));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: GatewayError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets the completion returned once the script is drained.
    pub fn with_default_response(mut self, content: impl Into<String>) -> Self {
        self.default_response = content.into();
        self
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All requests captured so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiGateway for MockGateway {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        self.calls.lock().unwrap().push(request);

        if let Some(ref error) = self.fail_always {
            return Err(error.clone());
        }

        let scripted = self.responses.lock().unwrap().pop_front();
        let content = match scripted {
            Some(Ok(content)) => content,
            Some(Err(error)) => return Err(error),
            None => self.default_response.clone(),
        };

        Ok(CompletionResponse {
            content,
            model: "mock-model".to_string(),
            finish_reason: FinishReason::Stop,
        })
    }

    fn gateway_info(&self) -> GatewayInfo {
        GatewayInfo::new("mock", "mock-model")
    }
}
