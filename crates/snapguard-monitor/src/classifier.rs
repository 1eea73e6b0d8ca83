//! Event classification state machine
//!
//! Turns raw filesystem notifications into durable backup actions. Most of
//! the pipeline's intelligence lives here: the settle delay for freshly
//! created files, the two-stage reappearance check that tells an editor's
//! delete-then-recreate "save" apart from a genuine deletion, temp-file
//! filtering, and the parent-exists check for folder deletions.
//!
//! ## Flow
//!
//! ```text
//! Deleted(file) ──▶ temp name? ──▶ discard
//!       │
//!       ▼ sleep(delete_confirm)
//!   reappeared? ──▶ discard (recreate noise)
//!       │
//!       ▼ sleep(save_detect)
//!   reappeared? ──▶ snapshot as modified (atomic save)
//!       │
//!       ▼
//!   deletion marker
//! ```
//!
//! Every classification is meant to run on its own spawned task; the sleeps
//! here must never run on the watcher callback thread.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use snapguard_core::config::DebounceConfig;
use snapguard_core::domain::BackupAction;
use snapguard_core::journal::EventJournal;

use crate::backup::{DeletionMarker, FolderDeletionHandler, VersionedBackupWriter};
use crate::watcher::FsChange;

// ============================================================================
// Helpers
// ============================================================================

/// Temp-file naming conventions whose deletions are never worth recording.
fn is_temp_name(name: &str) -> bool {
    name.starts_with('~') || name.starts_with(".tmp") || name.ends_with(".tmp")
}

/// Basename for journal messages, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

// ============================================================================
// PathState
// ============================================================================

/// Last observed status of a tracked path
///
/// Ephemeral bookkeeping: entries appear when a path produces a snapshot and
/// vanish when its deletion is confirmed or the path is superseded by a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathState {
    /// Action of the most recent snapshot written for this path
    pub last_action: BackupAction,
    /// When that action was classified
    pub seen_at: DateTime<Utc>,
}

// ============================================================================
// EventClassifier
// ============================================================================

/// Resolves raw filesystem events into backup actions
///
/// Holds the debounce windows and the per-path tracking map. All methods
/// take `&self`; the classifier is shared across per-event tasks behind an
/// `Arc` and the map is concurrency-safe.
pub struct EventClassifier {
    /// Snapshot writer receiving every confirmed file action
    writer: VersionedBackupWriter,
    /// Marker writer for deleted folders
    folders: FolderDeletionHandler,
    /// Journal receiving one entry per classified action or notable skip
    journal: Arc<EventJournal>,
    /// Debounce windows, config-tunable
    debounce: DebounceConfig,
    /// Paths with at least one snapshot this session
    tracked: DashMap<PathBuf, PathState>,
}

impl EventClassifier {
    /// Creates a classifier feeding the given writers
    ///
    /// # Arguments
    /// * `writer` - Snapshot writer for file actions
    /// * `folders` - Marker writer for folder deletions
    /// * `journal` - Shared journal for classified actions and skips
    /// * `debounce` - Settle and reappearance windows
    pub fn new(
        writer: VersionedBackupWriter,
        folders: FolderDeletionHandler,
        journal: Arc<EventJournal>,
        debounce: DebounceConfig,
    ) -> Self {
        Self {
            writer,
            folders,
            journal,
            debounce,
            tracked: DashMap::new(),
        }
    }

    /// Whether the path has produced a snapshot this session.
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked.contains_key(path)
    }

    /// Last recorded state for the path, if any.
    pub fn state_of(&self, path: &Path) -> Option<PathState> {
        self.tracked.get(path).map(|entry| entry.value().clone())
    }

    /// Classifies one filesystem change into zero or one backup action
    ///
    /// May sleep for the configured debounce windows; run it on a dedicated
    /// task, never on the event producer.
    pub async fn classify(&self, change: FsChange) {
        match change {
            FsChange::Created { path, is_dir } => self.on_created(path, is_dir).await,
            FsChange::Modified { path, is_dir } => self.on_modified(path, is_dir).await,
            FsChange::Deleted { path, is_dir } => self.on_deleted(path, is_dir).await,
            FsChange::Moved { from, to, is_dir } => self.on_moved(from, to, is_dir).await,
        }
    }

    // ------------------------------------------------------------------
    // Per-kind rules
    // ------------------------------------------------------------------

    async fn on_modified(&self, path: PathBuf, is_dir: bool) {
        if is_dir {
            // Folder modifications fire constantly; observe, never back up.
            debug!(path = %path.display(), "Folder modified");
            return;
        }
        self.snapshot(&path, BackupAction::Modified).await;
    }

    async fn on_created(&self, path: PathBuf, is_dir: bool) {
        if is_dir {
            debug!(path = %path.display(), "Folder created");
            return;
        }

        // Let the producing write finish before copying.
        tokio::time::sleep(self.debounce.create_settle()).await;

        if !file_exists(&path).await {
            debug!(path = %path.display(), "Created file already gone, skipping");
            return;
        }
        if is_directory(&path).await {
            debug!(path = %path.display(), "Settled path is a folder");
            return;
        }

        self.snapshot(&path, BackupAction::Created).await;
    }

    async fn on_deleted(&self, path: PathBuf, is_dir: bool) {
        if is_dir {
            self.on_folder_deleted(path).await;
            return;
        }

        let name = display_name(&path);
        if is_temp_name(&name) {
            debug!(name, "Ignored temp file delete");
            return;
        }

        // Short recheck first: editors often delete and immediately recreate.
        tokio::time::sleep(self.debounce.delete_confirm()).await;
        if file_exists(&path).await {
            debug!(path = %path.display(), "File reappeared, not a deletion");
            return;
        }

        // Longer recheck catches atomic save-as-replace.
        tokio::time::sleep(self.debounce.save_detect()).await;
        if file_exists(&path).await {
            info!(name, "Save detected, treating as modification");
            self.journal
                .info(format!("File was saved (not deleted): {name}"));
            self.snapshot(&path, BackupAction::Modified).await;
            return;
        }

        self.record_deletion(&path).await;
        self.tracked.remove(&path);
    }

    async fn on_folder_deleted(&self, path: PathBuf) {
        // A nested delete inside a larger recursive delete must not produce
        // its own marker; only the outermost deleted folder gets one.
        let parent_exists = match path.parent() {
            Some(parent) => file_exists(parent).await,
            None => false,
        };
        if !parent_exists {
            debug!(path = %path.display(), "Parent folder gone too, skipping marker");
            return;
        }

        match self.folders.write_folder_marker(&path).await {
            Ok(marker) => {
                info!(marker = %marker.display(), "Wrote folder deletion marker");
                self.journal
                    .warning(format!("Folder was deleted: {}", path.display()));
            }
            Err(err) => {
                self.journal.error(format!(
                    "Error recording folder deletion {}: {err}",
                    path.display()
                ));
            }
        }
    }

    async fn on_moved(&self, from: PathBuf, to: PathBuf, is_dir: bool) {
        if is_dir {
            debug!(from = %from.display(), to = %to.display(), "Folder moved");
            return;
        }

        debug!(from = %from.display(), to = %to.display(), "File moved");
        if file_exists(&to).await {
            self.snapshot(&to, BackupAction::Moved).await;
        }
        // The source path no longer exists under that name; the destination
        // entry supersedes it.
        self.tracked.remove(&from);
    }

    // ------------------------------------------------------------------
    // Writer plumbing
    // ------------------------------------------------------------------

    /// Writes one snapshot and journals the outcome.
    async fn snapshot(&self, path: &Path, action: BackupAction) {
        match self.writer.write_snapshot(path, action).await {
            Ok(Some(dest)) => {
                self.tracked.insert(
                    path.to_path_buf(),
                    PathState {
                        last_action: action,
                        seen_at: Utc::now(),
                    },
                );
                self.journal.success(format!(
                    "Backed up: {} -> {}",
                    display_name(path),
                    display_name(&dest)
                ));
            }
            Ok(None) => {
                self.journal
                    .warning(format!("{} - no file to copy", path.display()));
            }
            Err(err) => {
                self.journal
                    .error(format!("Error backing up {}: {err}", path.display()));
            }
        }
    }

    /// Records a confirmed deletion and journals which marker form was used.
    async fn record_deletion(&self, path: &Path) {
        let name = display_name(path);
        match self.writer.write_deletion_marker(path).await {
            Ok(DeletionMarker::PreservedCopy(dest)) => {
                self.journal.success(format!(
                    "Preserved last backup: {name} -> {}",
                    display_name(&dest)
                ));
            }
            Ok(DeletionMarker::Tombstone(dest)) => {
                self.journal.success(format!(
                    "Created deletion marker: {name} -> {}",
                    display_name(&dest)
                ));
            }
            Err(err) => {
                self.journal
                    .error(format!("Error backing up {}: {err}", path.display()));
            }
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
