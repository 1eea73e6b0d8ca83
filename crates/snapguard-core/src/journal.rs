//! Event journal - bounded in-memory log ring for control planes
//!
//! Every classified action, skip decision, and sync outcome is recorded as a
//! structured `{timestamp, message, severity}` entry. A control plane reads
//! the ring for display; the core never reads it back. The ring is bounded
//! (oldest entries evicted) and explicitly constructed at startup, then
//! shared as `Arc<EventJournal>` wherever entries are produced.
//!
//! Entries are mirrored into `tracing` at the matching level so operators
//! following the process logs see the same stream.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default number of entries retained before eviction
pub const DEFAULT_JOURNAL_CAPACITY: usize = 100;

/// Severity attached to a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine lifecycle and classification notes
    Info,
    /// A backup or upload that completed
    Success,
    /// A skip, missing path, or other recovered oddity
    Warning,
    /// A recovered failure (the pipeline continues)
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One journal record
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    /// When the entry was recorded
    pub timestamp: DateTime<Utc>,
    /// Human-readable description of what happened
    pub message: String,
    /// Entry severity
    pub severity: Severity,
}

/// Bounded ring of journal entries
///
/// Appends evict the oldest entry once the capacity is reached. All methods
/// take `&self`; the ring is safe to share across tasks.
pub struct EventJournal {
    entries: Mutex<VecDeque<JournalEntry>>,
    capacity: usize,
}

impl EventJournal {
    /// Creates a journal retaining at most `capacity` entries
    ///
    /// A zero capacity is clamped to 1 so that the most recent entry is
    /// always observable.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Records an entry and mirrors it into `tracing`
    ///
    /// # Arguments
    /// * `severity` - Severity of the entry
    /// * `message` - Human-readable description
    pub fn record(&self, severity: Severity, message: impl Into<String>) {
        let message = message.into();

        match severity {
            Severity::Info | Severity::Success => {
                tracing::info!(severity = %severity, "{message}")
            }
            Severity::Warning => tracing::warn!(severity = %severity, "{message}"),
            Severity::Error => tracing::error!(severity = %severity, "{message}"),
        }

        let entry = JournalEntry {
            timestamp: Utc::now(),
            message,
            severity,
        };

        let mut entries = self.lock_entries();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Records an info entry
    pub fn info(&self, message: impl Into<String>) {
        self.record(Severity::Info, message);
    }

    /// Records a success entry
    pub fn success(&self, message: impl Into<String>) {
        self.record(Severity::Success, message);
    }

    /// Records a warning entry
    pub fn warning(&self, message: impl Into<String>) {
        self.record(Severity::Warning, message);
    }

    /// Records an error entry
    pub fn error(&self, message: impl Into<String>) {
        self.record(Severity::Error, message);
    }

    /// Returns a snapshot of the current entries, oldest first
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.lock_entries().iter().cloned().collect()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// True when no entries have been recorded (or all were evicted)
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, VecDeque<JournalEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_CAPACITY)
    }
}
