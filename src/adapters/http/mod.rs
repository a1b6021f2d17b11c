//! HTTP adapters - REST API implementations.

pub mod reflection;

// Re-export key types for convenience
pub use reflection::reflection_router;
pub use reflection::ReflectionAppState;
