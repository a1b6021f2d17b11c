//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - AI gateway implementations (OpenAI, retry wrapper, mock)
//! - `http` - HTTP route handlers and DTOs

pub mod ai;
pub mod http;

pub use ai::{MockGateway, OpenAiConfig, OpenAiGateway, RetryGateway};
