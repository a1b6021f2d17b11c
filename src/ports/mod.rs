//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## AI Ports
//!
//! - `AiGateway` - Port for language-model text generation

mod ai_gateway;

pub use ai_gateway::{
    AiGateway, CompletionRequest, CompletionResponse, FinishReason, GatewayError, GatewayInfo,
};
