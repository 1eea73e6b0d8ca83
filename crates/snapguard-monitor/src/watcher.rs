//! Folder watching - recursive OS watches feeding the classifier
//!
//! Wraps the `notify` crate to monitor the configured root folders,
//! converting raw OS events into [`FsChange`] values on a channel. One
//! shared watcher carries every root, so all events funnel into a single
//! receiver; registrations are added and removed as a set when monitoring
//! starts and stops.
//!
//! ## Architecture
//!
//! ```text
//! inotify / kqueue
//!       │
//!       ▼
//!  FolderWatcher ──→ mpsc::channel ──→ (drain task) ──→ EventClassifier
//! ```
//!
//! The watcher callback does no waiting and no I/O beyond a stat; every
//! time-based decision lives in the classifier, which runs on the tokio
//! runtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use snapguard_core::domain::MonitorError;
use snapguard_core::journal::EventJournal;

/// Capacity of the raw change channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ============================================================================
// FsChange
// ============================================================================

/// A filesystem change detected on a watched root
///
/// Decoupled from the `notify` crate's raw event types. `is_dir` is
/// resolved at mapping time because a deleted path can no longer be
/// stat'ed by the time the classifier sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsChange {
    /// A new file or directory appeared
    Created { path: PathBuf, is_dir: bool },
    /// Content or metadata of an existing path changed
    Modified { path: PathBuf, is_dir: bool },
    /// A file or directory was removed
    Deleted { path: PathBuf, is_dir: bool },
    /// A file or directory was renamed within the watched tree
    Moved {
        /// Path before the rename
        from: PathBuf,
        /// Path after the rename
        to: PathBuf,
        is_dir: bool,
    },
}

impl FsChange {
    /// Returns the primary path of the change (the destination for moves).
    pub fn path(&self) -> &Path {
        match self {
            FsChange::Created { path, .. } => path,
            FsChange::Modified { path, .. } => path,
            FsChange::Deleted { path, .. } => path,
            FsChange::Moved { to, .. } => to,
        }
    }
}

// ============================================================================
// Event mapping - notify::Event → FsChange
// ============================================================================

/// Converts a `notify::Event` into an [`FsChange`]
///
/// Maps the notify event kinds as follows:
/// - `Create(kind)` -> `Created`, `is_dir` taken from the create kind
/// - `Modify(Name(Both))` with two paths -> `Moved`
/// - `Remove(kind)` -> `Deleted`, `is_dir` taken from the remove kind
/// - Other `Modify(*)` -> `Modified`
///
/// Returns `None` for events with no paths and for kinds that carry no
/// backup-relevant information (access notifications and the like).
fn map_notify_event(event: &notify::Event) -> Option<FsChange> {
    let paths = &event.paths;

    match &event.kind {
        EventKind::Create(kind) => {
            let path = paths.first()?.clone();
            let is_dir = match kind {
                CreateKind::Folder => true,
                CreateKind::File => false,
                _ => path.is_dir(),
            };
            debug!(path = %path.display(), is_dir, "Mapped Create event");
            Some(FsChange::Created { path, is_dir })
        }

        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if paths.len() >= 2 {
                let from = paths[0].clone();
                let to = paths[1].clone();
                let is_dir = to.is_dir();
                debug!(
                    from = %from.display(),
                    to = %to.display(),
                    is_dir,
                    "Mapped Rename event"
                );
                Some(FsChange::Moved { from, to, is_dir })
            } else {
                // Unpaired rename half; fall back to a modification so the
                // classifier's existence checks decide what it meant.
                let path = paths.first()?.clone();
                let is_dir = path.is_dir();
                debug!(path = %path.display(), "Rename with single path, treating as Modified");
                Some(FsChange::Modified { path, is_dir })
            }
        }

        EventKind::Remove(kind) => {
            let path = paths.first()?.clone();
            let is_dir = matches!(kind, RemoveKind::Folder);
            debug!(path = %path.display(), is_dir, "Mapped Remove event");
            Some(FsChange::Deleted { path, is_dir })
        }

        EventKind::Modify(_) => {
            // Data, metadata, and unpaired rename kinds all land here.
            let path = paths.first()?.clone();
            let is_dir = path.is_dir();
            debug!(path = %path.display(), kind = ?event.kind, "Mapped Modify event");
            Some(FsChange::Modified { path, is_dir })
        }

        _ => {
            debug!(kind = ?event.kind, "Ignoring event kind");
            None
        }
    }
}

// ============================================================================
// FolderWatcher
// ============================================================================

/// Owns the recursive watch registrations for the configured roots
///
/// One `RecommendedWatcher` instance serves every root. Starting replaces
/// any previous registration set; stopping unregisters everything and
/// drops the watcher so the change channel closes and a drain loop can
/// exit cleanly.
pub struct FolderWatcher {
    /// Journal receiving skipped-root warnings
    journal: Arc<EventJournal>,
    /// The underlying notify watcher, present while active
    watcher: Option<RecommendedWatcher>,
    /// Roots with a live watch registration
    roots: Vec<PathBuf>,
}

impl FolderWatcher {
    /// Creates an inactive watcher.
    pub fn new(journal: Arc<EventJournal>) -> Self {
        Self {
            journal,
            watcher: None,
            roots: Vec::new(),
        }
    }

    /// Roots currently under an active watch.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether the watcher is active.
    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    /// Starts one recursive watch per existing root
    ///
    /// A root that does not exist on disk is journaled as a warning and
    /// skipped; the remaining roots are still watched. When no root could
    /// be watched at all, an error is journaled and the returned channel
    /// simply never yields.
    ///
    /// Calling `start` while already active replaces the previous
    /// registration set.
    ///
    /// # Arguments
    /// * `roots` - Directories to watch recursively
    ///
    /// # Returns
    /// The receiving end of the change channel. It closes once [`stop`]
    /// (or a replacing `start`) drops the watcher.
    ///
    /// # Errors
    /// Returns an error only when the OS watch mechanism itself cannot be
    /// constructed.
    ///
    /// [`stop`]: FolderWatcher::stop
    pub fn start(&mut self, roots: &[PathBuf]) -> Result<mpsc::Receiver<FsChange>> {
        self.stop();

        let (event_tx, event_rx) = mpsc::channel::<FsChange>(EVENT_CHANNEL_CAPACITY);

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if let Some(change) = map_notify_event(&event) {
                        if let Err(err) = event_tx.blocking_send(change) {
                            warn!(error = %err, "Failed to send change event (receiver dropped)");
                        }
                    }
                }
                Err(err) => {
                    error!(error = %err, "Folder watcher error");
                }
            },
            notify::Config::default(),
        )
        .context("Failed to create folder watcher")?;

        for root in roots {
            if !root.exists() {
                warn!(path = %root.display(), "Folder does not exist");
                self.journal
                    .warning(format!("Folder does not exist: {}", root.display()));
                continue;
            }

            match watcher.watch(root, RecursiveMode::Recursive) {
                Ok(()) => {
                    info!(path = %root.display(), "Monitoring folder");
                    self.roots.push(root.clone());
                }
                Err(err) => {
                    let setup = MonitorError::WatchSetup {
                        path: root.clone(),
                        reason: err.to_string(),
                    };
                    warn!(path = %root.display(), "Failed to watch folder");
                    self.journal.error(setup.to_string());
                }
            }
        }

        if self.roots.is_empty() {
            self.journal.error("No valid folders to monitor");
        }

        self.watcher = Some(watcher);
        Ok(event_rx)
    }

    /// Unregisters every active watch and drops the watcher
    ///
    /// Dropping the watcher drops the callback and with it the channel
    /// sender, closing the receiver. Events in flight at stop time may be
    /// lost; that is accepted.
    pub fn stop(&mut self) {
        let Some(mut watcher) = self.watcher.take() else {
            return;
        };

        for root in self.roots.drain(..) {
            match watcher.unwatch(&root) {
                Ok(()) => info!(path = %root.display(), "Stopped watching folder"),
                Err(err) => {
                    debug!(path = %root.display(), error = %err, "Unwatch failed during stop")
                }
            }
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
