//! Integration tests for the HTTP blob store adapter
//!
//! Uses wiremock to stand in for the remote vault API and verifies the
//! request/response handling of every IBlobStore operation.

use wiremock::matchers::{body_bytes, method, path};
use wiremock::{Mock, ResponseTemplate};

use snapguard_core::ports::IBlobStore;

use crate::common::{mount_list, mount_put, setup_store_mock};

#[tokio::test]
async fn put_uploads_bytes_and_returns_id() {
    let (server, store) = setup_store_mock().await;

    Mock::given(method("PUT"))
        .and(path("/objects/report.txt_modified_20250115_093000"))
        .and(body_bytes(b"snapshot payload".to_vec()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "obj-42" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let id = store
        .put(
            "report.txt_modified_20250115_093000",
            b"snapshot payload".to_vec(),
        )
        .await
        .expect("put should succeed");

    assert_eq!(id, "obj-42");
}

#[tokio::test]
async fn put_propagates_server_errors() {
    let (server, store) = setup_store_mock().await;

    Mock::given(method("PUT"))
        .and(path("/objects/broken.bin_created_20250101_000000"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = store
        .put("broken.bin_created_20250101_000000", vec![1, 2, 3])
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn get_returns_object_bytes() {
    let (server, store) = setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path("/objects/notes.md_created_20250110_081500"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
        .mount(&server)
        .await;

    let bytes = store
        .get("notes.md_created_20250110_081500")
        .await
        .expect("get should succeed");

    assert_eq!(bytes, Some(b"hello world".to_vec()));
}

#[tokio::test]
async fn get_maps_missing_object_to_none() {
    let (server, store) = setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path("/objects/nonexistent_deleted_20250101_000000"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let bytes = store
        .get("nonexistent_deleted_20250101_000000")
        .await
        .expect("404 should not be an error");

    assert!(bytes.is_none());
}

#[tokio::test]
async fn delete_targets_object_by_id() {
    let (server, store) = setup_store_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/objects/obj-7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store.delete("obj-7").await.expect("delete should succeed");
}

#[tokio::test]
async fn delete_propagates_server_errors() {
    let (server, store) = setup_store_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/objects/obj-8"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(store.delete("obj-8").await.is_err());
}

#[tokio::test]
async fn list_parses_remote_objects() {
    let (server, store) = setup_store_mock().await;

    mount_list(
        &server,
        serde_json::json!([
            {
                "id": "obj-1",
                "name": "report.txt_created_20250110_081500",
                "size": 1024,
                "uploaded_at": "2025-01-10T08:15:30Z"
            },
            {
                "id": "obj-2",
                "name": "report.txt_modified_20250115_093000",
                "size": 2048,
                "uploaded_at": "2025-01-15T09:30:12Z"
            }
        ]),
    )
    .await;

    let objects = store.list().await.expect("list should succeed");

    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].id, "obj-1");
    assert_eq!(objects[0].name, "report.txt_created_20250110_081500");
    assert_eq!(objects[0].size, 1024);
    assert_eq!(objects[1].id, "obj-2");
    assert_eq!(objects[1].uploaded_at.to_rfc3339(), "2025-01-15T09:30:12+00:00");
}

#[tokio::test]
async fn list_handles_empty_vault() {
    let (server, store) = setup_store_mock().await;

    mount_list(&server, serde_json::json!([])).await;

    let objects = store.list().await.expect("list should succeed");
    assert!(objects.is_empty());
}

#[tokio::test]
async fn folder_marker_names_survive_the_url_path() {
    // Folder deletion markers carry square brackets in their names. The
    // url crate leaves brackets unencoded in path segments, so the mock
    // must see the literal name.
    let (server, store) = setup_store_mock().await;

    let name = "[FOLDER]_photos_deleted_20250101_120000_info.txt";
    mount_put(&server, name, "obj-folder").await;

    let id = store
        .put(name, b"marker body".to_vec())
        .await
        .expect("put should succeed");

    assert_eq!(id, "obj-folder");
}
