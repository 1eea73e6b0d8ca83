//! Snapshot naming and the monotonic snapshot clock
//!
//! Every backup written to the backup directory is named
//! `<basename>_<action>_<timestamp>`, with the timestamp at second
//! resolution. Downstream listing code (and the deletion-marker lookup)
//! parses these names back into their parts, so formatting and parsing
//! live together here as the single source of truth.
//!
//! ## Design Notes
//!
//! Parsing is strict: the remainder after `<basename>_` must be exactly an
//! action tag followed by a well-formed timestamp. Loose prefix matching
//! would let backups of `report.txt` claim snapshots of `report.txt.bak`,
//! and would make the "latest snapshot" lookup nondeterministic.

use std::sync::{Mutex, PoisonError};

use chrono::{Local, NaiveDateTime, Timelike};

use crate::domain::action::BackupAction;

/// Timestamp format embedded in snapshot filenames, e.g. `20250823_142251`
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Prefix marking folder-deletion markers in the backup directory
pub const FOLDER_MARKER_PREFIX: &str = "[FOLDER]_";

/// Suffix of folder-deletion marker filenames
pub const FOLDER_MARKER_SUFFIX: &str = "_info.txt";

/// Length of a formatted snapshot timestamp (`YYYYMMDD_HHMMSS`)
const TIMESTAMP_LEN: usize = 15;

// ============================================================================
// SnapshotName
// ============================================================================

/// The parsed parts of a snapshot filename
///
/// A `SnapshotName` ties together the original file's basename, the
/// classified action, and the second-resolution timestamp assigned by the
/// [`SnapshotClock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotName {
    /// Basename of the original file this snapshot captures
    pub basename: String,
    /// The classified action that produced the snapshot
    pub action: BackupAction,
    /// Second-resolution local timestamp embedded in the name
    pub timestamp: NaiveDateTime,
}

impl SnapshotName {
    /// Creates a snapshot name from its parts
    pub fn new(basename: impl Into<String>, action: BackupAction, timestamp: NaiveDateTime) -> Self {
        Self {
            basename: basename.into(),
            action,
            timestamp,
        }
    }

    /// Renders the on-disk filename, e.g. `notes.txt_modified_20250823_142251`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.basename,
            self.action,
            self.timestamp.format(SNAPSHOT_TIMESTAMP_FORMAT)
        )
    }

    /// Parses a directory entry name as a snapshot of `basename`
    ///
    /// Returns `None` unless the name is exactly
    /// `<basename>_<action>_<timestamp>` with a known action tag and a
    /// well-formed timestamp. Names that merely share a prefix with
    /// `basename` are rejected.
    ///
    /// # Arguments
    /// * `file_name` - A candidate filename from the backup directory
    /// * `basename` - The original file's basename to match against
    pub fn parse(file_name: &str, basename: &str) -> Option<Self> {
        let rest = file_name.strip_prefix(basename)?.strip_prefix('_')?;

        for action in BackupAction::ALL {
            if let Some(ts_str) = rest
                .strip_prefix(action.as_str())
                .and_then(|r| r.strip_prefix('_'))
            {
                if ts_str.len() != TIMESTAMP_LEN {
                    continue;
                }
                if let Ok(timestamp) =
                    NaiveDateTime::parse_from_str(ts_str, SNAPSHOT_TIMESTAMP_FORMAT)
                {
                    return Some(Self::new(basename, action, timestamp));
                }
            }
        }

        None
    }
}

/// Renders a folder-deletion marker filename
///
/// Follows `[FOLDER]_<folderName>_deleted_<timestamp>_info.txt`, the scheme
/// listing code uses to distinguish folder markers from file snapshots.
pub fn folder_marker_name(folder_name: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}{}_deleted_{}{}",
        FOLDER_MARKER_PREFIX,
        folder_name,
        timestamp.format(SNAPSHOT_TIMESTAMP_FORMAT),
        FOLDER_MARKER_SUFFIX
    )
}

// ============================================================================
// SnapshotClock
// ============================================================================

/// Produces second-resolution timestamps that never move backwards
///
/// Snapshot names carry second-resolution timestamps, and the append-only
/// history contract requires them to be monotonically non-decreasing per
/// process even if the wall clock steps backwards (NTP adjustment, DST).
/// The clock clamps each reading to the latest value it has handed out.
pub struct SnapshotClock {
    /// The most recent timestamp handed out, if any
    last: Mutex<Option<NaiveDateTime>>,
}

impl SnapshotClock {
    /// Creates a clock with no prior reading
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Returns the current local time, truncated to seconds and clamped to
    /// be no earlier than the previous reading
    pub fn now(&self) -> NaiveDateTime {
        let wall = Local::now().naive_local();
        let wall = wall.with_nanosecond(0).unwrap_or(wall);

        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let next = match *last {
            Some(prev) if prev > wall => prev,
            _ => wall,
        };
        *last = Some(next);
        next
    }
}

impl Default for SnapshotClock {
    fn default() -> Self {
        Self::new()
    }
}
