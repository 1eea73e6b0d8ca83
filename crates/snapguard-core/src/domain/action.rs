//! Backup action tags
//!
//! Every snapshot name embeds the action that produced it. The four actions
//! mirror the durable outcomes the event classifier can resolve a raw
//! filesystem event into.

use serde::{Deserialize, Serialize};

use crate::domain::errors::MonitorError;

/// The classified action recorded in a snapshot's filename
///
/// Snapshot names follow `<basename>_<action>_<timestamp>`, so the action's
/// string form is part of the on-disk contract and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupAction {
    /// A new file appeared and settled
    Created,
    /// An existing file's content changed
    Modified,
    /// A file was genuinely removed (not a save-as-replace)
    Deleted,
    /// A file arrived at a new path via rename/move
    Moved,
}

impl BackupAction {
    /// All actions, in the order they are most commonly produced.
    ///
    /// Used when parsing snapshot filenames back into their parts.
    pub const ALL: [BackupAction; 4] = [
        BackupAction::Created,
        BackupAction::Modified,
        BackupAction::Deleted,
        BackupAction::Moved,
    ];

    /// Returns the lowercase string embedded in snapshot filenames
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupAction::Created => "created",
            BackupAction::Modified => "modified",
            BackupAction::Deleted => "deleted",
            BackupAction::Moved => "moved",
        }
    }
}

impl std::fmt::Display for BackupAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackupAction {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(BackupAction::Created),
            "modified" => Ok(BackupAction::Modified),
            "deleted" => Ok(BackupAction::Deleted),
            "moved" => Ok(BackupAction::Moved),
            other => Err(MonitorError::InvalidAction(other.to_string())),
        }
    }
}
