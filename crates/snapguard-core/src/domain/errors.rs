//! Domain error types
//!
//! This module defines error types specific to monitoring and backup
//! operations, including watch setup failures, backup I/O errors, and
//! snapshot name parsing failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in monitoring and backup operations
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The OS-level watch mechanism could not be constructed or registered
    #[error("Watch setup failed for {path}: {reason}")]
    WatchSetup {
        /// The root that could not be watched
        path: PathBuf,
        /// Underlying failure description
        reason: String,
    },

    /// The backup directory could not be created or written
    #[error("Backup directory unavailable: {0}")]
    BackupDirUnavailable(PathBuf),

    /// An action string that is not one of created/modified/deleted/moved
    #[error("Invalid backup action: {0}")]
    InvalidAction(String),

    /// A source path with no usable basename (e.g. a bare root)
    #[error("Path has no basename: {0}")]
    NoBasename(PathBuf),

    /// An I/O error during a backup copy or marker write
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonitorError::WatchSetup {
            path: PathBuf::from("/data"),
            reason: "inotify limit reached".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Watch setup failed for /data: inotify limit reached"
        );

        let err = MonitorError::InvalidAction("renamed".to_string());
        assert_eq!(err.to_string(), "Invalid backup action: renamed");

        let err = MonitorError::NoBasename(PathBuf::from("/"));
        assert_eq!(err.to_string(), "Path has no basename: /");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: MonitorError = io.into();
        assert!(matches!(err, MonitorError::Io(_)));
    }
}
