//! Chat orchestration and port trait definitions for Palaver.
//!
//! This crate defines the "ports" (repository, filesystem and LLM provider
//! traits) that the infrastructure layer implements, plus the chat
//! orchestrator that drives one request/response round-trip. It depends
//! only on `palaver-types` -- never on `palaver-infra` or any HTTP crate.

pub mod chat;
pub mod llm;
pub mod storage;
