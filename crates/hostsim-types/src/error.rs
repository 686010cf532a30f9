//! Error taxonomy for the simulation kernel.
//!
//! The `File not found: {path}` and `Directory not found: {path}` message
//! shapes are matched on by host-facing callers and must not change.

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;

/// Filesystem operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsError {
    /// No node exists at the path.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// The path resolves to a file where a directory was required.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    /// A file node occupies a path where a directory was requested.
    #[error("File exists: {0}")]
    FileExists(String),
    /// The input could not be interpreted as a path.
    #[error("Invalid path: {0:?}")]
    InvalidPath(String),
    /// File content is not valid UTF-8 and a string read was requested.
    #[error("File is not valid UTF-8: {0}")]
    NotUtf8(String),
}

/// Event substrate errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    /// The cancellation source was disposed; its token is no longer reachable.
    #[error("cancellation source has been disposed")]
    SourceDisposed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_shapes_are_literal() {
        assert_eq!(
            FsError::FileNotFound("/p/a.txt".into()).to_string(),
            "File not found: /p/a.txt"
        );
        assert_eq!(
            FsError::DirectoryNotFound("/p/a.txt".into()).to_string(),
            "Directory not found: /p/a.txt"
        );
    }

    #[test]
    fn file_exists_names_the_path() {
        let err = FsError::FileExists("/p".into());
        assert_eq!(err.to_string(), "File exists: /p");
    }
}
