//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `reflection` - The reflective-dialogue state machine (stages, routing,
//!   session driver)

pub mod reflection;
