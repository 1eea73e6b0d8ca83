//! Shared test helpers for blob store integration tests
//!
//! Provides wiremock-based mock server setup for the vault object API.
//! Each helper mounts the necessary mock endpoints and returns a configured
//! HttpBlobStore pointing at the mock server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use snapguard_store::http::HttpBlobStore;

/// Starts a mock server and returns a (MockServer, HttpBlobStore) pair.
pub async fn setup_store_mock() -> (MockServer, HttpBlobStore) {
    let server = MockServer::start().await;
    let store = HttpBlobStore::new(server.uri()).expect("build store");
    (server, store)
}

/// Mounts a PUT endpoint for `name` that answers with the given id.
pub async fn mount_put(server: &MockServer, name: &str, id: &str) {
    Mock::given(method("PUT"))
        .and(path(format!("/objects/{name}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": id })),
        )
        .mount(server)
        .await;
}

/// Mounts a listing endpoint returning the given objects JSON array.
pub async fn mount_list(server: &MockServer, objects: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(objects))
        .mount(server)
        .await;
}
