//! AI Gateway Adapters.
//!
//! Implementations of the `AiGateway` port.
//!
//! ## Available Adapters
//!
//! - `MockGateway` - Configurable scripted double for testing
//! - `OpenAiGateway` - OpenAI chat-completions API
//! - `RetryGateway` - Wrapper adding bounded retry with backoff

mod mock_gateway;
mod openai_gateway;
mod retry_gateway;

pub use mock_gateway::MockGateway;
pub use openai_gateway::{OpenAiConfig, OpenAiGateway};
pub use retry_gateway::RetryGateway;
