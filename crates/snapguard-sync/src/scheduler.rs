//! Sync scheduler - periodic, connectivity-gated backup uploads
//!
//! The [`SyncScheduler`] mirrors the backup directory to a remote
//! [`IBlobStore`] on a fixed interval (default 30 minutes). Every pass is
//! gated on an [`IConnectivityProbe`] check; an offline tick is a deferral,
//! not an error, and is retried at the next tick.
//!
//! ## Flow
//!
//! ```text
//! interval tick ──┐
//!                 ├──→ probe ──→ list() ──→ per file: delete old id → put
//! request_sync ───┘   (gate)    (name→id)
//! ```
//!
//! The remote holds at most one object per filename: when a name already
//! exists remotely, the old object is deleted before the new bytes are put.
//! A failed delete skips that file's put so the remote never accumulates two
//! objects under one name. Per-file failures are journaled and do not abort
//! the rest of the pass.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use snapguard_core::journal::EventJournal;
use snapguard_core::ports::{IBlobStore, IConnectivityProbe};

/// Default pause between upload passes (30 minutes)
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(1800);

// ============================================================================
// SchedulerState
// ============================================================================

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next interval tick or a manual request
    Idle,
    /// An upload pass is in progress
    Syncing,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Syncing => write!(f, "syncing"),
        }
    }
}

// ============================================================================
// SyncReport
// ============================================================================

/// Summary of one completed upload pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files uploaded (including replacements of existing remote objects)
    pub files_uploaded: u32,
    /// Files that could not be uploaded this pass
    pub files_failed: u32,
}

// ============================================================================
// SyncScheduler
// ============================================================================

/// Interval-driven uploader mirroring the backup directory to a blob store
///
/// Two states: [`Idle`](SchedulerState::Idle) between passes and
/// [`Syncing`](SchedulerState::Syncing) while a pass runs. A pass only
/// starts when the connectivity probe reports reachable; skipped ticks do
/// not advance the last-completed marker. Completed passes (clean or with
/// per-file failures) reset the interval so the next pass lands a full
/// interval later.
///
/// ## Dependencies
///
/// - `store`: remote object operations (list, put, delete)
/// - `probe`: yes/no reachability gate checked before every pass
/// - `journal`: receives skip decisions and pass outcomes
pub struct SyncScheduler {
    /// Remote object store receiving the backup files
    store: Arc<dyn IBlobStore>,
    /// Reachability gate consulted before each pass
    probe: Arc<dyn IConnectivityProbe>,
    /// Control-plane journal for skip decisions and outcomes
    journal: Arc<EventJournal>,
    /// Directory whose regular files are mirrored remotely
    backup_dir: PathBuf,
    /// Pause between passes
    interval: Duration,
    /// Current observable state
    state: Mutex<SchedulerState>,
    /// When the last pass completed; never advanced by skipped ticks
    last_completed: Mutex<Option<DateTime<Utc>>>,
    /// Wakes the run loop for an immediate, still-gated pass
    sync_requested: Notify,
}

impl SyncScheduler {
    /// Creates a scheduler over the given backup directory
    ///
    /// # Arguments
    /// * `store` - Remote blob store to mirror into
    /// * `probe` - Connectivity gate checked before every pass
    /// * `journal` - Journal receiving skip decisions and outcomes
    /// * `backup_dir` - Directory whose regular files are uploaded
    /// * `interval` - Pause between passes
    pub fn new(
        store: Arc<dyn IBlobStore>,
        probe: Arc<dyn IConnectivityProbe>,
        journal: Arc<EventJournal>,
        backup_dir: PathBuf,
        interval: Duration,
    ) -> Self {
        info!(
            backup_dir = %backup_dir.display(),
            interval_secs = interval.as_secs(),
            "Creating sync scheduler"
        );

        Self {
            store,
            probe,
            journal,
            backup_dir,
            interval,
            state: Mutex::new(SchedulerState::Idle),
            last_completed: Mutex::new(None),
            sync_requested: Notify::new(),
        }
    }

    /// Returns the current scheduler state.
    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// When the most recent pass completed, if any has.
    ///
    /// Connectivity-skipped ticks and aborted passes leave this unchanged;
    /// it resets on process restart (no persistence).
    pub fn last_completed(&self) -> Option<DateTime<Utc>> {
        *self
            .last_completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests an immediate pass outside the normal interval
    ///
    /// The pass is still connectivity-gated; if it completes, the interval
    /// timer resets so the next scheduled pass lands a full interval later.
    pub fn request_sync(&self) {
        info!("Immediate sync requested");
        self.sync_requested.notify_one();
    }

    // ========================================================================
    // Run loop
    // ========================================================================

    /// Main scheduler loop
    ///
    /// Waits for interval ticks and [`request_sync`](Self::request_sync)
    /// wakeups, running one gated pass per trigger, until `shutdown` is
    /// cancelled. A pass already in progress at shutdown finishes its
    /// current store call before the loop observes the cancellation.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Sync scheduler starting");

        let mut ticker = tokio::time::interval(self.interval);
        // The first tick of a tokio interval fires immediately; consume it
        // so the first pass happens one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Sync scheduler shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    if self.run_once().await.is_some() {
                        ticker.reset();
                    }
                }

                _ = self.sync_requested.notified() => {
                    if self.run_once().await.is_some() {
                        ticker.reset();
                    }
                }
            }
        }

        info!("Sync scheduler stopped");
    }

    // ========================================================================
    // One gated pass
    // ========================================================================

    /// Runs a single connectivity-gated upload pass
    ///
    /// # Returns
    /// `Some(report)` when the pass completed (cleanly or with per-file
    /// failures), `None` when it was skipped (offline) or aborted before
    /// any upload could be attempted (listing failure). Only completed
    /// passes advance [`last_completed`](Self::last_completed).
    pub async fn run_once(&self) -> Option<SyncReport> {
        if !self.probe.is_reachable().await {
            self.journal.warning("No internet connection, skipping upload");
            return None;
        }

        self.set_state(SchedulerState::Syncing);
        let outcome = self.upload_pass().await;
        self.set_state(SchedulerState::Idle);

        if let Some(report) = outcome {
            *self
                .last_completed
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());

            if report.files_failed == 0 {
                self.journal
                    .success(format!("Upload completed: {} file(s) sent", report.files_uploaded));
            } else {
                self.journal.warning(format!(
                    "Upload completed with failures: {} sent, {} failed",
                    report.files_uploaded, report.files_failed
                ));
            }
        }

        outcome
    }

    /// Uploads every regular file in the backup directory
    ///
    /// Lists the remote once to build a name-to-id map, then walks the
    /// directory replacing (delete old id, put new bytes) or creating each
    /// object. Returns `None` only when the pass could not start at all.
    async fn upload_pass(&self) -> Option<SyncReport> {
        let mut report = SyncReport::default();

        if !self.backup_dir.is_dir() {
            warn!(
                path = %self.backup_dir.display(),
                "Backup folder not found, nothing to upload"
            );
            self.journal.warning("Backup folder not found, nothing to upload");
            return Some(report);
        }

        let remote_ids: HashMap<String, String> = match self.store.list().await {
            Ok(objects) => objects.into_iter().map(|o| (o.name, o.id)).collect(),
            Err(err) => {
                error!(error = %err, "Failed to list remote objects, aborting pass");
                self.journal.error(format!("Upload failed: {err:#}"));
                return None;
            }
        };

        let mut entries = match tokio::fs::read_dir(&self.backup_dir).await {
            Ok(entries) => entries,
            Err(err) => {
                error!(
                    path = %self.backup_dir.display(),
                    error = %err,
                    "Failed to read backup folder, aborting pass"
                );
                self.journal.error(format!("Upload failed: {err}"));
                return None;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    error!(error = %err, "Failed to walk backup folder, stopping pass early");
                    self.journal.error(format!("Upload interrupted: {err}"));
                    break;
                }
            };

            let is_file = match entry.file_type().await {
                Ok(kind) => kind.is_file(),
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "Skipping unreadable entry");
                    continue;
                }
            };
            if !is_file {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();

            let bytes = match tokio::fs::read(entry.path()).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    error!(name = %name, error = %err, "Failed to read backup file");
                    self.journal
                        .error(format!("Upload failed for {name}: {err}"));
                    report.files_failed += 1;
                    continue;
                }
            };

            // Replace-by-name: the old object must be gone before the new
            // bytes go up, otherwise the remote would hold two objects
            // under one name.
            if let Some(id) = remote_ids.get(&name) {
                if let Err(err) = self.store.delete(id).await {
                    error!(name = %name, id = %id, error = %err, "Failed to replace remote object");
                    self.journal
                        .error(format!("Upload failed for {name}: {err:#}"));
                    report.files_failed += 1;
                    continue;
                }
            }

            match self.store.put(&name, bytes).await {
                Ok(id) => {
                    debug!(name = %name, id = %id, "Uploaded backup file");
                    report.files_uploaded += 1;
                }
                Err(err) => {
                    error!(name = %name, error = %err, "Failed to upload backup file");
                    self.journal
                        .error(format!("Upload failed for {name}: {err:#}"));
                    report.files_failed += 1;
                }
            }
        }

        info!(
            uploaded = report.files_uploaded,
            failed = report.files_failed,
            "Upload pass finished"
        );

        Some(report)
    }

    fn set_state(&self, next: SchedulerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

// ============================================================================
// Unit tests
// ============================================================================
