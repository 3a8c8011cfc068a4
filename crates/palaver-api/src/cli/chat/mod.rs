//! Interactive terminal chat.
//!
//! Streams replies as they arrive, renders them as markdown, and persists
//! every round-trip. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
