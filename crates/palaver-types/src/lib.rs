//! Shared domain types for Palaver.
//!
//! This crate contains the core domain types used across the workspace:
//! chat turns, session identifiers, the model history mirror, LLM request
//! and streaming shapes, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
