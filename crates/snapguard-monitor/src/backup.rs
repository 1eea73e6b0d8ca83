//! Snapshot and marker writing
//!
//! Materializes the append-only backup history. Every classified file
//! action becomes one immutable file in the backup directory named
//! `<basename>_<action>_<timestamp>`; deletions become either a copy of
//! the most recent prior snapshot or a textual tombstone, and deleted
//! folders get a `[FOLDER]_..._info.txt` marker describing the loss.
//!
//! ## Design Notes
//!
//! - The writer performs no waiting; all debounce decisions happen in the
//!   classifier before anything lands here.
//! - "Most recent prior snapshot" is chosen by the timestamp embedded in
//!   the filename, with the full name as tie-break inside one second.
//!   Directory listing order carries no meaning.
//! - Two snapshots of the same file and action within the same second
//!   collide on one name; the second write wins. Accepted precision limit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

use snapguard_core::domain::{
    folder_marker_name, BackupAction, MonitorError, SnapshotClock, SnapshotName,
};

// ============================================================================
// Helpers
// ============================================================================

/// Extracts the final path component as a string.
fn basename_of(path: &Path) -> Result<String, MonitorError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| MonitorError::NoBasename(path.to_path_buf()))
}

/// Creates the backup directory if it does not exist yet.
async fn ensure_backup_dir(dir: &Path) -> Result<(), MonitorError> {
    tokio::fs::create_dir_all(dir).await.map_err(|err| {
        warn!(path = %dir.display(), error = %err, "Cannot create backup directory");
        MonitorError::BackupDirUnavailable(dir.to_path_buf())
    })
}

/// Local wall-clock time in ISO-8601 form, for marker payloads.
fn iso_timestamp() -> String {
    Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

// ============================================================================
// DeletionMarker
// ============================================================================

/// How a file deletion was recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionMarker {
    /// The most recent prior snapshot was copied forward under the
    /// `deleted` name, preserving the last known content
    PreservedCopy(PathBuf),
    /// No prior snapshot existed; a textual tombstone records the loss
    Tombstone(PathBuf),
}

impl DeletionMarker {
    /// Path of the written marker file.
    pub fn path(&self) -> &Path {
        match self {
            DeletionMarker::PreservedCopy(path) => path,
            DeletionMarker::Tombstone(path) => path,
        }
    }
}

// ============================================================================
// VersionedBackupWriter
// ============================================================================

/// Writes versioned snapshots into the backup directory
///
/// Snapshots are never mutated after being written; every action appends
/// a new file. The backup directory is created lazily on first write.
pub struct VersionedBackupWriter {
    /// Directory receiving snapshots and markers
    backup_dir: PathBuf,
    /// Shared monotonic clock stamping snapshot names
    clock: Arc<SnapshotClock>,
}

impl VersionedBackupWriter {
    /// Creates a writer over the given backup directory
    ///
    /// # Arguments
    /// * `backup_dir` - Directory receiving snapshots (created on demand)
    /// * `clock` - Clock shared with other writers so timestamps never
    ///   move backwards within the process
    pub fn new(backup_dir: PathBuf, clock: Arc<SnapshotClock>) -> Self {
        Self { backup_dir, clock }
    }

    /// The directory this writer appends to.
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copies the file at `path` into a new snapshot
    ///
    /// # Arguments
    /// * `path` - Source file to capture
    /// * `action` - Classified action embedded in the snapshot name
    ///
    /// # Returns
    /// The snapshot path, or `None` when the source vanished between
    /// event detection and the copy (the caller journals that skip).
    ///
    /// # Errors
    /// Fails when the path has no basename, the backup directory cannot
    /// be created, or the copy itself fails for a reason other than the
    /// source disappearing.
    pub async fn write_snapshot(
        &self,
        path: &Path,
        action: BackupAction,
    ) -> Result<Option<PathBuf>, MonitorError> {
        let basename = basename_of(path)?;
        ensure_backup_dir(&self.backup_dir).await?;

        let name = SnapshotName::new(basename, action, self.clock.now());
        let dest = self.backup_dir.join(name.file_name());

        match tokio::fs::copy(path, &dest).await {
            Ok(bytes) => {
                debug!(
                    src = %path.display(),
                    dest = %dest.display(),
                    bytes,
                    "Wrote snapshot"
                );
                Ok(Some(dest))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "No file to copy, source vanished");
                Ok(None)
            }
            Err(err) => Err(MonitorError::Io(err)),
        }
    }

    /// Records the deletion of the file at `path`
    ///
    /// Prefers copying forward the most recent prior snapshot of the same
    /// basename, so the last known content survives the deletion. Without
    /// a prior snapshot, writes a tombstone naming the lost path:
    ///
    /// ```text
    /// File was deleted: <path>
    /// Timestamp: <ISO-8601>
    /// ```
    pub async fn write_deletion_marker(
        &self,
        path: &Path,
    ) -> Result<DeletionMarker, MonitorError> {
        let basename = basename_of(path)?;
        ensure_backup_dir(&self.backup_dir).await?;

        let name = SnapshotName::new(basename.clone(), BackupAction::Deleted, self.clock.now());
        let dest = self.backup_dir.join(name.file_name());

        if let Some(prior) = self.find_latest_snapshot(&basename).await? {
            match tokio::fs::copy(&prior, &dest).await {
                Ok(_) => {
                    debug!(
                        prior = %prior.display(),
                        dest = %dest.display(),
                        "Preserved last snapshot as deletion marker"
                    );
                    return Ok(DeletionMarker::PreservedCopy(dest));
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    // The prior snapshot vanished between listing and copy;
                    // fall through to the tombstone.
                    warn!(prior = %prior.display(), "Prior snapshot vanished, writing tombstone");
                }
                Err(err) => return Err(MonitorError::Io(err)),
            }
        }

        let content = format!(
            "File was deleted: {}\nTimestamp: {}\n",
            path.display(),
            iso_timestamp()
        );
        tokio::fs::write(&dest, content).await?;
        debug!(dest = %dest.display(), "Wrote deletion tombstone");

        Ok(DeletionMarker::Tombstone(dest))
    }

    /// Finds the most recent snapshot of `basename`
    ///
    /// Selects by the timestamp embedded in each name, tie-breaking on the
    /// full filename so the choice is deterministic within one second.
    async fn find_latest_snapshot(
        &self,
        basename: &str,
    ) -> Result<Option<PathBuf>, MonitorError> {
        let mut entries = match tokio::fs::read_dir(&self.backup_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(MonitorError::Io(err)),
        };

        let mut latest: Option<(NaiveDateTime, String, PathBuf)> = None;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(parsed) = SnapshotName::parse(name, basename) else {
                continue;
            };

            let newer = match &latest {
                None => true,
                Some((ts, existing, _)) => (parsed.timestamp, name) > (*ts, existing.as_str()),
            };
            if newer {
                latest = Some((parsed.timestamp, name.to_string(), entry.path()));
            }
        }

        Ok(latest.map(|(_, _, path)| path))
    }
}

// ============================================================================
// FolderDeletionHandler
// ============================================================================

/// Records deleted folders that could not be captured
///
/// By the time a folder deletion event arrives the contents are already
/// gone, so all that can be written is a marker describing the loss.
pub struct FolderDeletionHandler {
    /// Directory receiving the markers
    backup_dir: PathBuf,
    /// Shared monotonic clock stamping marker names
    clock: Arc<SnapshotClock>,
}

impl FolderDeletionHandler {
    /// Creates a handler writing markers into `backup_dir`.
    pub fn new(backup_dir: PathBuf, clock: Arc<SnapshotClock>) -> Self {
        Self { backup_dir, clock }
    }

    /// Writes a `[FOLDER]_<name>_deleted_<ts>_info.txt` marker
    ///
    /// # Arguments
    /// * `folder` - The deleted folder's path
    ///
    /// # Returns
    /// The path of the written marker file
    pub async fn write_folder_marker(&self, folder: &Path) -> Result<PathBuf, MonitorError> {
        let folder_name = basename_of(folder)?;
        ensure_backup_dir(&self.backup_dir).await?;

        let marker = self
            .backup_dir
            .join(folder_marker_name(&folder_name, self.clock.now()));

        let content = format!(
            "Folder was deleted: {path}\n\
             Folder name: {name}\n\
             Full path: {path}\n\
             Timestamp: {ts}\n\
             \n\
             Note: Folder contents could not be backed up as the folder was already deleted.\n\
             To backup folder contents before deletion, stop monitoring before deleting the folder.\n",
            path = folder.display(),
            name = folder_name,
            ts = iso_timestamp(),
        );
        tokio::fs::write(&marker, content).await?;
        debug!(marker = %marker.display(), "Wrote folder deletion marker");

        Ok(marker)
    }
}

// ============================================================================
// Unit tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn writer_in(dir: &Path) -> VersionedBackupWriter {
        VersionedBackupWriter::new(dir.to_path_buf(), Arc::new(SnapshotClock::new()))
    }

    #[tokio::test]
    async fn test_write_snapshot_copies_bytes() {
        let src_dir = tempfile::tempdir().unwrap();
        let backup_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("notes.txt");
        std::fs::write(&source, b"hello").unwrap();

        let writer = writer_in(backup_dir.path());
        let dest = writer
            .write_snapshot(&source, BackupAction::Modified)
            .await
            .unwrap()
            .expect("source exists");

        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");

        let file_name = dest.file_name().unwrap().to_str().unwrap();
        let parsed = SnapshotName::parse(file_name, "notes.txt").expect("well-formed name");
        assert_eq!(parsed.action, BackupAction::Modified);
    }

    #[tokio::test]
    async fn test_write_snapshot_creates_backup_dir_lazily() {
        let src_dir = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let backup_dir = root.path().join("backups");
        let source = src_dir.path().join("a.txt");
        std::fs::write(&source, b"x").unwrap();

        let writer = VersionedBackupWriter::new(backup_dir.clone(), Arc::new(SnapshotClock::new()));
        let dest = writer
            .write_snapshot(&source, BackupAction::Created)
            .await
            .unwrap();

        assert!(dest.is_some());
        assert!(backup_dir.is_dir());
    }

    #[tokio::test]
    async fn test_write_snapshot_vanished_source_is_a_noop() {
        let backup_dir = tempfile::tempdir().unwrap();
        let writer = writer_in(backup_dir.path());

        let outcome = writer
            .write_snapshot(Path::new("/definitely/not/here.txt"), BackupAction::Created)
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(std::fs::read_dir(backup_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_snapshot_rejects_path_without_basename() {
        let backup_dir = tempfile::tempdir().unwrap();
        let writer = writer_in(backup_dir.path());

        let err = writer
            .write_snapshot(Path::new("/"), BackupAction::Created)
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::NoBasename(_)));
    }

    #[tokio::test]
    async fn test_deletion_marker_copies_latest_prior_snapshot() {
        let backup_dir = tempfile::tempdir().unwrap();

        // Written newest-first so directory order cannot accidentally be
        // right; selection must go by the embedded timestamp.
        std::fs::write(
            backup_dir.path().join("a.txt_modified_20250102_000000"),
            b"new",
        )
        .unwrap();
        std::fs::write(
            backup_dir.path().join("a.txt_created_20250101_000000"),
            b"old",
        )
        .unwrap();

        let writer = writer_in(backup_dir.path());
        let marker = writer
            .write_deletion_marker(Path::new("/data/a.txt"))
            .await
            .unwrap();

        match marker {
            DeletionMarker::PreservedCopy(path) => {
                assert_eq!(std::fs::read(path).unwrap(), b"new");
            }
            DeletionMarker::Tombstone(_) => panic!("expected a preserved copy"),
        }
    }

    #[tokio::test]
    async fn test_deletion_marker_tie_break_is_deterministic() {
        let backup_dir = tempfile::tempdir().unwrap();

        // Same second, two actions: the lexically larger name wins.
        std::fs::write(
            backup_dir.path().join("a.txt_created_20250101_000000"),
            b"x",
        )
        .unwrap();
        std::fs::write(backup_dir.path().join("a.txt_moved_20250101_000000"), b"y").unwrap();

        let writer = writer_in(backup_dir.path());
        let marker = writer
            .write_deletion_marker(Path::new("/data/a.txt"))
            .await
            .unwrap();

        match marker {
            DeletionMarker::PreservedCopy(path) => {
                assert_eq!(std::fs::read(path).unwrap(), b"y");
            }
            DeletionMarker::Tombstone(_) => panic!("expected a preserved copy"),
        }
    }

    #[tokio::test]
    async fn test_deletion_marker_ignores_other_basenames() {
        let backup_dir = tempfile::tempdir().unwrap();

        std::fs::write(
            backup_dir.path().join("b.txt_created_20250101_000000"),
            b"other",
        )
        .unwrap();
        std::fs::write(
            backup_dir.path().join("a.txt.bak_modified_20250101_000000"),
            b"lookalike",
        )
        .unwrap();

        let writer = writer_in(backup_dir.path());
        let marker = writer
            .write_deletion_marker(Path::new("/data/a.txt"))
            .await
            .unwrap();

        assert!(matches!(marker, DeletionMarker::Tombstone(_)));
    }

    #[tokio::test]
    async fn test_deletion_tombstone_content() {
        let backup_dir = tempfile::tempdir().unwrap();
        let writer = writer_in(backup_dir.path());

        let marker = writer
            .write_deletion_marker(Path::new("/data/ghost.txt"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(marker.path()).unwrap();
        assert!(content.starts_with("File was deleted: /data/ghost.txt\n"));
        assert!(content.contains("Timestamp: "));

        let file_name = marker.path().file_name().unwrap().to_str().unwrap();
        let parsed = SnapshotName::parse(file_name, "ghost.txt").expect("marker name parses");
        assert_eq!(parsed.action, BackupAction::Deleted);
    }

    #[tokio::test]
    async fn test_deletion_marker_can_chain_from_prior_marker() {
        let backup_dir = tempfile::tempdir().unwrap();

        // A previous deletion marker is itself the latest snapshot.
        std::fs::write(
            backup_dir.path().join("a.txt_deleted_20250103_000000"),
            b"final",
        )
        .unwrap();
        std::fs::write(
            backup_dir.path().join("a.txt_modified_20250102_000000"),
            b"older",
        )
        .unwrap();

        let writer = writer_in(backup_dir.path());
        let marker = writer
            .write_deletion_marker(Path::new("/data/a.txt"))
            .await
            .unwrap();

        match marker {
            DeletionMarker::PreservedCopy(path) => {
                assert_eq!(std::fs::read(path).unwrap(), b"final");
            }
            DeletionMarker::Tombstone(_) => panic!("expected a preserved copy"),
        }
    }

    #[tokio::test]
    async fn test_folder_marker_content_and_name() {
        let backup_dir = tempfile::tempdir().unwrap();
        let handler = FolderDeletionHandler::new(
            backup_dir.path().to_path_buf(),
            Arc::new(SnapshotClock::new()),
        );

        let marker = handler
            .write_folder_marker(Path::new("/data/projects"))
            .await
            .unwrap();

        let file_name = marker.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("[FOLDER]_projects_deleted_"));
        assert!(file_name.ends_with("_info.txt"));

        let content = std::fs::read_to_string(&marker).unwrap();
        assert!(content.starts_with("Folder was deleted: /data/projects\n"));
        assert!(content.contains("Folder name: projects\n"));
        assert!(content.contains("Full path: /data/projects\n"));
        assert!(content.contains("Timestamp: "));
        assert!(content.contains(
            "Note: Folder contents could not be backed up as the folder was already deleted.\n"
        ));
        assert!(content.ends_with(
            "To backup folder contents before deletion, stop monitoring before deleting the folder.\n"
        ));
    }
}
