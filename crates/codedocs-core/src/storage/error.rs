//! Storage error handling
//!
//! Provides typed errors for catalog and document file operations with
//! descriptive messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create the directory holding a file
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Catalog file cannot be parsed
    #[error("Invalid catalog format in '{path}': {details}")]
    InvalidFormat { path: PathBuf, details: String },

    /// Catalog could not be encoded
    #[error("Failed to encode catalog: {0}")]
    Encode(#[from] serde_json::Error),

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Create an error from a failed write with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match classify(error, path) {
            Ok(err) => err,
            Err((error, path)) => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Create an error from a failed read with path context
    pub fn from_read_io(error: io::Error, path: PathBuf) -> Self {
        match classify(error, path) {
            Ok(err) => err,
            Err((error, path)) => StorageError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions, then re-run the same command.")
            }
            StorageError::InvalidFormat { .. } => {
                Some("Fix or remove the catalog file. `codedocs render` rebuilds the document once the catalog loads.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Map the io error kinds that are independent of the operation
fn classify(error: io::Error, path: PathBuf) -> Result<StorageError, (io::Error, PathBuf)> {
    match error.kind() {
        io::ErrorKind::PermissionDenied => Ok(StorageError::PermissionDenied {
            path,
            source: error,
        }),
        io::ErrorKind::NotFound => Ok(StorageError::NotFound { path }),
        // StorageFull is not reported on every platform; also match the message
        _ if is_disk_full_error(&error) => Ok(StorageError::DiskFull {
            path,
            source: error,
        }),
        _ => Err((error, path)),
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from_read_io(io_err, PathBuf::from("/missing/file"));

        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_fallback_depends_on_operation() {
        let read = StorageError::from_read_io(
            io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
            PathBuf::from("README.md"),
        );
        assert!(matches!(read, StorageError::ReadError { .. }));

        let write = StorageError::from_io(
            io::Error::new(io::ErrorKind::Other, "broken pipe"),
            PathBuf::from("README.md"),
        );
        assert!(matches!(write, StorageError::WriteError { .. }));
        assert!(write.recovery_suggestion().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::PermissionDenied {
            path: PathBuf::from("/test/file"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        let msg = err.to_string();
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("/test/file"));
    }

    #[test]
    fn test_invalid_format_display() {
        let err = StorageError::InvalidFormat {
            path: PathBuf::from("/project/functions.json"),
            details: "expected value at line 1 column 1".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("functions.json"));
        assert!(msg.contains("line 1"));
        assert!(err.recovery_suggestion().is_some());
    }
}
