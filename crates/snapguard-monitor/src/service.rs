//! Monitoring facade
//!
//! `MonitorService` wires the watcher, the classifier and the snapshot
//! writers into one idempotent start/stop surface for the daemon.
//!
//! ## Architecture
//!
//! ```text
//! start_monitoring(roots, backup_dir)
//!        │
//!        ▼
//! FolderWatcher ──mpsc──▶ drain task ──spawn──▶ classify(event)
//!                             │                     │
//!                        TaskTracker ◀──────────────┘
//! ```
//!
//! The drain task forwards each event to its own spawned classification
//! task so debounce waits on one path never delay another path's events.
//! Stopping closes the watcher, which closes the channel, which ends the
//! drain loop; the tracker then waits for in-flight classifications so
//! their short debounce windows finish naturally.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use snapguard_core::config::DebounceConfig;
use snapguard_core::domain::SnapshotClock;
use snapguard_core::journal::EventJournal;

use crate::backup::{FolderDeletionHandler, VersionedBackupWriter};
use crate::classifier::EventClassifier;
use crate::watcher::FolderWatcher;

// ============================================================================
// ActiveMonitor
// ============================================================================

/// One running monitoring pipeline.
struct ActiveMonitor {
    watcher: FolderWatcher,
    tasks: TaskTracker,
    roots: Vec<PathBuf>,
    backup_dir: PathBuf,
}

// ============================================================================
// MonitorService
// ============================================================================

/// Control surface over the monitoring pipeline
///
/// Owns at most one active pipeline at a time. Both entry points are
/// idempotent: starting with an unchanged configuration is a no-op,
/// starting with a changed one restarts the pipeline, and stopping an
/// inactive service does nothing.
pub struct MonitorService {
    /// Journal shared with every component of the pipeline
    journal: Arc<EventJournal>,
    /// Debounce windows handed to each new classifier
    debounce: DebounceConfig,
    /// The running pipeline, if any
    active: Mutex<Option<ActiveMonitor>>,
}

impl MonitorService {
    /// Creates an idle service
    ///
    /// # Arguments
    /// * `journal` - Shared journal receiving lifecycle and action entries
    /// * `debounce` - Windows applied by the classifier of each run
    pub fn new(journal: Arc<EventJournal>, debounce: DebounceConfig) -> Self {
        Self {
            journal,
            debounce,
            active: Mutex::new(None),
        }
    }

    /// Whether a pipeline is currently running.
    pub async fn is_monitoring(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Roots of the running pipeline, empty when idle.
    pub async fn watched_roots(&self) -> Vec<PathBuf> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|monitor| monitor.roots.clone())
            .unwrap_or_default()
    }

    /// Starts monitoring the given roots
    ///
    /// Re-invoking with the same roots and backup directory is a no-op;
    /// a changed configuration stops the running pipeline first.
    ///
    /// # Arguments
    /// * `roots` - Directories to watch recursively
    /// * `backup_dir` - Directory receiving snapshots and markers
    ///
    /// # Errors
    /// Only construction of the watch mechanism itself is fatal; missing
    /// roots are journaled and skipped.
    pub async fn start_monitoring(
        &self,
        roots: Vec<PathBuf>,
        backup_dir: PathBuf,
    ) -> anyhow::Result<()> {
        let mut active = self.active.lock().await;

        if let Some(monitor) = active.as_ref() {
            if monitor.roots == roots && monitor.backup_dir == backup_dir {
                debug!("Monitoring already active with the same configuration");
                return Ok(());
            }
            // Configuration changed: restart.
            if let Some(previous) = active.take() {
                self.shutdown(previous).await;
            }
        }

        let clock = Arc::new(SnapshotClock::new());
        let writer = VersionedBackupWriter::new(backup_dir.clone(), Arc::clone(&clock));
        let folders = FolderDeletionHandler::new(backup_dir.clone(), clock);
        let classifier = Arc::new(EventClassifier::new(
            writer,
            folders,
            Arc::clone(&self.journal),
            self.debounce.clone(),
        ));

        let mut watcher = FolderWatcher::new(Arc::clone(&self.journal));
        let mut events = watcher
            .start(&roots)
            .context("Failed to start monitoring")?;

        let tasks = TaskTracker::new();
        let drain_tasks = tasks.clone();
        tasks.spawn(async move {
            while let Some(change) = events.recv().await {
                let classifier = Arc::clone(&classifier);
                drain_tasks.spawn(async move { classifier.classify(change).await });
            }
            debug!("Event drain loop finished");
        });

        info!(roots = roots.len(), backup_dir = %backup_dir.display(), "Monitoring started");
        self.journal.success("Monitoring started");

        *active = Some(ActiveMonitor {
            watcher,
            tasks,
            roots,
            backup_dir,
        });
        Ok(())
    }

    /// Stops the running pipeline, waiting for in-flight classifications
    ///
    /// No-op when nothing is running. Events whose debounce window had not
    /// elapsed at stop time still finish; events never drained are lost.
    pub async fn stop_monitoring(&self) {
        let mut active = self.active.lock().await;
        match active.take() {
            Some(monitor) => self.shutdown(monitor).await,
            None => debug!("Monitoring not active"),
        }
    }

    async fn shutdown(&self, mut monitor: ActiveMonitor) {
        monitor.watcher.stop();
        monitor.tasks.close();
        monitor.tasks.wait().await;
        info!("Monitoring stopped");
        self.journal.warning("Monitoring stopped");
    }
}

// ============================================================================
// Unit tests
// ============================================================================
