//! Domain entities and business logic
//!
//! This module contains the core domain types for Snapguard:
//! - Backup action tags embedded in snapshot names
//! - Snapshot naming, parsing, and the monotonic snapshot clock
//! - Domain-specific error types

pub mod action;
pub mod errors;
pub mod snapshot;

// Re-export commonly used types
pub use action::BackupAction;
pub use errors::MonitorError;
pub use snapshot::{
    folder_marker_name, SnapshotClock, SnapshotName, FOLDER_MARKER_PREFIX,
    SNAPSHOT_TIMESTAMP_FORMAT,
};
