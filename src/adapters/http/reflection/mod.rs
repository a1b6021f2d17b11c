//! HTTP adapter for the reflection API.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::ReflectionAppState;
pub use routes::routes as reflection_router;
