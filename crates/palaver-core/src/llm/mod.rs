//! LLM provider abstractions for Palaver.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `StreamInSpan`: keeps a tracing span open for a stream's lifetime

pub mod box_provider;
pub mod instrument;
pub mod provider;
