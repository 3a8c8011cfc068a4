//! Chat orchestration for Palaver.
//!
//! - `catalog`: session browsing and deletion that needs no provider
//! - `repository`: the `ChatRepository` port for the three per-conversation records
//! - `remote`: the `RemoteChat` handle wrapping one provider-side conversation
//! - `response`: fragment accumulation for a streamed reply
//! - `session`: the in-memory `ChatSession`
//! - `service`: `ChatService`, which drives a full round-trip

pub mod catalog;
pub mod remote;
pub mod repository;
pub mod response;
pub mod service;
pub mod session;
