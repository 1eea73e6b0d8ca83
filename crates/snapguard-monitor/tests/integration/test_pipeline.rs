//! End-to-end pipeline tests over real filesystem events
//!
//! Each test starts a MonitorService on a temporary root, mutates files
//! the way a user or editor would, and polls the backup directory for the
//! snapshots the pipeline is expected to produce.

use std::time::Duration;

use crate::common;

#[tokio::test]
async fn test_create_modify_delete_history() {
    let root = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    let (service, journal) = common::idle_service();

    service
        .start_monitoring(
            vec![root.path().to_path_buf()],
            backups.path().to_path_buf(),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Create: after the settle window a `created` snapshot holds "x".
    let file = root.path().join("a.txt");
    std::fs::write(&file, b"x").unwrap();
    let names = common::wait_for_backups(backups.path(), |names| {
        common::find_prefixed(names, "a.txt_created_").is_some()
    })
    .await;
    let created = common::find_prefixed(&names, "a.txt_created_").unwrap();
    assert_eq!(std::fs::read(backups.path().join(created)).unwrap(), b"x");

    // Overwrite: a `modified` snapshot holds "y".
    std::fs::write(&file, b"y").unwrap();
    common::wait_for_backups(backups.path(), |names| {
        names.iter().any(|name| {
            name.starts_with("a.txt_modified_")
                && std::fs::read(backups.path().join(name))
                    .map(|content| content == b"y")
                    .unwrap_or(false)
        })
    })
    .await;

    // Delete with no recreate: the marker copies the latest snapshot.
    std::fs::remove_file(&file).unwrap();
    let names = common::wait_for_backups(backups.path(), |names| {
        common::find_prefixed(names, "a.txt_deleted_").is_some()
    })
    .await;
    let deleted = common::find_prefixed(&names, "a.txt_deleted_").unwrap();
    assert_eq!(std::fs::read(backups.path().join(deleted)).unwrap(), b"y");

    service.stop_monitoring().await;

    let entries = journal.entries();
    assert!(entries.iter().any(|e| e.message == "Monitoring started"));
    assert!(entries.iter().any(|e| e.message.starts_with("Backed up: a.txt")));
    assert!(entries
        .iter()
        .any(|e| e.message.starts_with("Preserved last backup: a.txt")));
    assert!(entries.iter().any(|e| e.message == "Monitoring stopped"));
}

#[tokio::test]
async fn test_rename_produces_moved_snapshot() {
    let root = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    let (service, _journal) = common::idle_service();

    service
        .start_monitoring(
            vec![root.path().to_path_buf()],
            backups.path().to_path_buf(),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let old = root.path().join("old.txt");
    std::fs::write(&old, b"z").unwrap();
    common::wait_for_backups(backups.path(), |names| {
        common::find_prefixed(names, "old.txt_created_").is_some()
    })
    .await;

    std::fs::rename(&old, root.path().join("new.txt")).unwrap();
    let names = common::wait_for_backups(backups.path(), |names| {
        common::find_prefixed(names, "new.txt_moved_").is_some()
    })
    .await;
    let moved = common::find_prefixed(&names, "new.txt_moved_").unwrap();
    assert_eq!(std::fs::read(backups.path().join(moved)).unwrap(), b"z");

    service.stop_monitoring().await;
}

#[tokio::test]
async fn test_folder_deletion_leaves_info_marker() {
    let root = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();

    // The folder predates monitoring; only its deletion is an event.
    let docs = root.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(docs.join("readme.txt"), b"hi").unwrap();

    let (service, _journal) = common::idle_service();
    service
        .start_monitoring(
            vec![root.path().to_path_buf()],
            backups.path().to_path_buf(),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    std::fs::remove_dir_all(&docs).unwrap();

    let names = common::wait_for_backups(backups.path(), |names| {
        common::find_prefixed(names, "[FOLDER]_docs_deleted_").is_some()
    })
    .await;
    let markers: Vec<_> = names
        .iter()
        .filter(|name| name.starts_with("[FOLDER]_docs_deleted_"))
        .collect();
    assert_eq!(markers.len(), 1);
    assert!(markers[0].ends_with("_info.txt"));

    let content =
        std::fs::read_to_string(backups.path().join(markers[0])).unwrap();
    assert!(content.contains("Folder name: docs"));

    service.stop_monitoring().await;
}

#[tokio::test]
async fn test_temp_file_deletion_never_leaves_a_marker() {
    let root = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    let (service, _journal) = common::idle_service();

    service
        .start_monitoring(
            vec![root.path().to_path_buf()],
            backups.path().to_path_buf(),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Temp-named files are still backed up while alive...
    let temp = root.path().join("~draft.txt");
    std::fs::write(&temp, b"tmp").unwrap();
    common::wait_for_backups(backups.path(), |names| {
        common::find_prefixed(names, "~draft.txt_created_").is_some()
    })
    .await;

    // ...but deleting one is silent. A plain file deleted afterwards acts
    // as the sentinel proving the pipeline kept flowing.
    std::fs::remove_file(&temp).unwrap();
    let real = root.path().join("real.txt");
    std::fs::write(&real, b"r").unwrap();
    common::wait_for_backups(backups.path(), |names| {
        common::find_prefixed(names, "real.txt_created_").is_some()
    })
    .await;
    std::fs::remove_file(&real).unwrap();

    let names = common::wait_for_backups(backups.path(), |names| {
        common::find_prefixed(names, "real.txt_deleted_").is_some()
    })
    .await;
    assert!(common::find_prefixed(&names, "~draft.txt_deleted_").is_none());

    service.stop_monitoring().await;
}
