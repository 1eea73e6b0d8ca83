//! Snapguard Monitor - filesystem watching and versioned backups
//!
//! Provides the pipeline that turns raw OS filesystem events into an
//! append-only backup history:
//!
//! ```text
//! inotify / kqueue
//!       │
//!       ▼
//! FolderWatcher ──→ mpsc::channel ──→ EventClassifier ──→ VersionedBackupWriter
//!                                          │                FolderDeletionHandler
//!                                          ▼
//!                                    EventJournal
//! ```
//!
//! ## Modules
//!
//! - [`watcher`] - Recursive OS watches over the configured roots
//! - [`classifier`] - Debounce state machine resolving raw events into actions
//! - [`backup`] - Snapshot and deletion-marker writing
//! - [`service`] - Start/stop facade wiring the pieces together

pub mod backup;
pub mod classifier;
pub mod service;
pub mod watcher;

pub use backup::{DeletionMarker, FolderDeletionHandler, VersionedBackupWriter};
pub use classifier::EventClassifier;
pub use service::MonitorService;
pub use watcher::{FolderWatcher, FsChange};
