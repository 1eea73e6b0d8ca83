//! Integration tests for snapguard-monitor
//!
//! Drives the full pipeline (watcher, classifier, writers) over real
//! temporary directories and real filesystem events.

mod common;

mod test_pipeline;
