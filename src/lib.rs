//! Reflection Coach - Stateless Conversational Reflection Service
//!
//! This crate implements a guided-reflection dialogue agent: a probing loop
//! with sentiment-aware questions, a summarization step with bounded
//! self-correction, and a final goal-capture exchange. The server holds no
//! session state; the full dialogue state round-trips through the caller on
//! every turn.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
