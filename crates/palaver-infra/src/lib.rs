//! Infrastructure layer for Palaver.
//!
//! Contains implementations of the ports defined in `palaver-core`:
//! the JSON-file chat repository, the local filesystem adapter, the
//! `config.toml` loader, environment credential lookup and the concrete
//! LLM providers (native Gemini and OpenAI-compatible).

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
