//! FileSystem trait for abstracting file I/O.
//!
//! Defined in palaver-core so repositories can read and write records without
//! depending on any specific filesystem implementation. The `LocalFileSystem`
//! adapter lives in palaver-infra.

use std::path::Path;

/// Abstraction over filesystem operations.
pub trait FileSystem: Send + Sync {
    /// Write string content to a file, creating parent directories as needed.
    ///
    /// Replaces any existing content.
    fn write_file(
        &self,
        path: &Path,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;

    /// Read a file's content as a string.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    fn read_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<Option<String>, std::io::Error>> + Send;

    /// Remove a file. Returns `Ok(false)` when it did not exist.
    fn remove_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<bool, std::io::Error>> + Send;
}
