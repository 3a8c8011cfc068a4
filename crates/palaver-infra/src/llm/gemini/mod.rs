//! Native Google Gemini provider.
//!
//! This module provides the [`GeminiProvider`] which implements the
//! [`LlmProvider`](palaver_core::llm::provider::LlmProvider) trait for the
//! Gemini `generateContent` and `streamGenerateContent` endpoints.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::GeminiProvider;
