//! Filesystem adapters for Palaver.
//!
//! Implements the `FileSystem` trait from `palaver-core` for real filesystem
//! I/O, and provides the JSON-file chat repository built on top of it.

pub mod chat;

use std::path::{Path, PathBuf};

use palaver_core::storage::fs::FileSystem;

/// Local filesystem implementation of the `FileSystem` trait.
///
/// All operations go through `tokio::fs` for async I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await
    }

    async fn read_file(&self, path: &Path) -> Result<Option<String>, std::io::Error> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn remove_file(&self, path: &Path) -> Result<bool, std::io::Error> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PALAVER_DATA_DIR` environment variable
/// 2. `~/.palaver` in the user's home directory
/// 3. `.palaver` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PALAVER_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".palaver");
    }

    PathBuf::from(".palaver")
}
