//! Retry Gateway - wrapper that adds bounded retry with backoff.
//!
//! Encapsulates the retry policy once, behind the same `AiGateway` port, so
//! the domain stages never see retry mechanics. Only transient failures
//! (`GatewayError::is_retryable`) are retried; auth and request errors fail
//! immediately.
//!
//! # Example
//!
//! ```ignore
//! let gateway = RetryGateway::new(OpenAiGateway::new(config))
//!     .with_max_retries(2)
//!     .with_base_delay(Duration::from_millis(250));
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::ports::{
    AiGateway, CompletionRequest, CompletionResponse, GatewayError, GatewayInfo,
};

/// Gateway wrapper with bounded retry and exponential backoff.
pub struct RetryGateway<G: AiGateway> {
    inner: G,
    max_retries: u32,
    base_delay: Duration,
}

impl<G: AiGateway> RetryGateway<G> {
    /// Wraps a gateway with the default budget (2 retries, 250ms base delay).
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            max_retries: 2,
            base_delay: Duration::from_millis(250),
        }
    }

    /// Sets the maximum number of retries after the first attempt.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff base delay (doubled per retry).
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }
}

#[async_trait]
impl<G: AiGateway> AiGateway for RetryGateway<G> {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        let mut attempt = 0;

        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.base_delay * 2u32.pow(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient gateway failure, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn gateway_info(&self) -> GatewayInfo {
        self.inner.gateway_info()
    }
}
