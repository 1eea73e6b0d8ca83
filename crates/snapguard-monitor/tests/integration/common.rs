//! Shared test helpers for monitor integration tests
//!
//! Real filesystem events are asynchronous, so assertions poll the backup
//! directory for an expected snapshot instead of sleeping fixed amounts.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use snapguard_core::config::DebounceConfig;
use snapguard_core::journal::EventJournal;
use snapguard_monitor::MonitorService;

/// Generous ceiling for one event to travel the whole pipeline.
pub const PIPELINE_DEADLINE: Duration = Duration::from_secs(5);

/// Debounce windows shortened so tests finish quickly.
pub fn short_debounce() -> DebounceConfig {
    DebounceConfig {
        create_settle_ms: 25,
        delete_confirm_ms: 15,
        save_detect_ms: 40,
    }
}

/// Builds an idle service around a fresh journal.
pub fn idle_service() -> (MonitorService, Arc<EventJournal>) {
    let journal = Arc::new(EventJournal::new(100));
    let service = MonitorService::new(Arc::clone(&journal), short_debounce());
    (service, journal)
}

/// Names currently present in the backup directory, sorted.
pub fn backup_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Polls the backup directory until `pred` accepts its contents
///
/// Returns the accepted name list; panics with the final directory listing
/// when the deadline passes first.
pub async fn wait_for_backups<F>(dir: &Path, pred: F) -> Vec<String>
where
    F: Fn(&[String]) -> bool,
{
    let deadline = tokio::time::Instant::now() + PIPELINE_DEADLINE;
    loop {
        let names = backup_names(dir);
        if pred(&names) {
            return names;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("backup directory never reached the expected state: {names:?}");
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

/// First name with the given prefix, if any.
pub fn find_prefixed<'a>(names: &'a [String], prefix: &str) -> Option<&'a String> {
    names.iter().find(|name| name.starts_with(prefix))
}
