//! Storage abstractions for Palaver.
//!
//! Defines the filesystem port used by file-backed repositories.
//! Implementations live in palaver-infra.

pub mod fs;
