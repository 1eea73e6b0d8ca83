//! HTTP blob store adapter
//!
//! Speaks the vault's object API:
//!
//! - `PUT /objects/{name}` with an octet-stream body, returning `{"id": ...}`
//! - `GET /objects/{name}` returning the raw bytes, or 404
//! - `DELETE /objects/{id}`
//! - `GET /objects` returning the full object listing as JSON
//!
//! ## Usage
//!
//! ```rust,no_run
//! use snapguard_store::http::HttpBlobStore;
//! use snapguard_core::ports::IBlobStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = HttpBlobStore::new("http://vault.local:9000")?;
//! let id = store.put("notes.txt_modified_20250823_142251", b"hello".to_vec()).await?;
//! store.delete(&id).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use snapguard_core::ports::{IBlobStore, RemoteObject};
use tracing::debug;

/// Bound on any single request to the vault
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response body of `PUT /objects/{name}`
#[derive(Debug, Deserialize)]
struct PutResponse {
    /// Store-assigned identifier for the new object
    id: String,
}

/// HTTP client for the vault's object API
///
/// Wraps `reqwest::Client` with base URL construction and a request
/// timeout. The base URL is injectable so tests can point the adapter at a
/// mock server.
pub struct HttpBlobStore {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without a trailing slash
    base_url: String,
}

impl HttpBlobStore {
    /// Creates a store adapter for the given endpoint
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the vault API, e.g. `http://vault:9000`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let mut base_url = endpoint.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    /// Returns the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a request builder for the given method and path
    ///
    /// Automatically prepends the base URL.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, PUT, DELETE)
    /// * `path` - API path relative to the base URL, e.g. "/objects"
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }
}

#[async_trait::async_trait]
impl IBlobStore for HttpBlobStore {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String> {
        debug!(name, size = bytes.len(), "Uploading object");

        let response: PutResponse = self
            .request(Method::PUT, &format!("/objects/{name}"))
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("Failed to upload object: {name}"))?
            .error_for_status()
            .with_context(|| format!("PUT /objects/{name} returned error status"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse upload response for: {name}"))?;

        Ok(response.id)
    }

    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        debug!(name, "Downloading object");

        let response = self
            .request(Method::GET, &format!("/objects/{name}"))
            .send()
            .await
            .with_context(|| format!("Failed to fetch object: {name}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let bytes = response
            .error_for_status()
            .with_context(|| format!("GET /objects/{name} returned error status"))?
            .bytes()
            .await
            .with_context(|| format!("Failed to read object body: {name}"))?;

        Ok(Some(bytes.to_vec()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        debug!(id, "Deleting object");

        self.request(Method::DELETE, &format!("/objects/{id}"))
            .send()
            .await
            .with_context(|| format!("Failed to delete object: {id}"))?
            .error_for_status()
            .with_context(|| format!("DELETE /objects/{id} returned error status"))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<RemoteObject>> {
        debug!("Listing objects");

        let objects: Vec<RemoteObject> = self
            .request(Method::GET, "/objects")
            .send()
            .await
            .context("Failed to list objects")?
            .error_for_status()
            .context("GET /objects returned error status")?
            .json()
            .await
            .context("Failed to parse object listing")?;

        debug!(count = objects.len(), "Listed objects");
        Ok(objects)
    }
}
