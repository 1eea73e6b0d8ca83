//! Blob store port - remote storage keyed by object name
//!
//! The backup history is mirrored to a remote store holding at most one
//! object per filename. Replacing an object is two calls: `delete` the old
//! id, then `put` the new bytes. The core never assumes transactional
//! semantics across these calls.
//!
//! ## Design Notes
//!
//! - Uses `#[async_trait]` for async trait methods.
//! - Methods return `anyhow::Result`; adapters add context to errors.
//! - `RemoteObject` is a port-level DTO, not a domain entity: it carries
//!   whatever the remote reports, without local interpretation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one remote object, as reported by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Store-assigned opaque identifier, used for deletion
    pub id: String,
    /// Object name (a backup filename); unique per store
    pub name: String,
    /// Object size in bytes
    pub size: u64,
    /// When the store received the object
    pub uploaded_at: DateTime<Utc>,
}

/// Remote blob storage operations
///
/// Implementations must be safe to share across tasks; the scheduler holds
/// one instance behind an `Arc` for the lifetime of the process.
#[async_trait::async_trait]
pub trait IBlobStore: Send + Sync {
    /// Uploads `bytes` under `name`, returning the store-assigned id
    ///
    /// Callers replacing an existing object must `delete` the prior id
    /// first; `put` itself never overwrites.
    ///
    /// # Arguments
    /// * `name` - Object name (unique per store)
    /// * `bytes` - Object content
    ///
    /// # Errors
    /// Returns an error if the upload fails or the store rejects the name
    async fn put(&self, name: &str, bytes: Vec<u8>) -> anyhow::Result<String>;

    /// Downloads the object stored under `name`
    ///
    /// # Returns
    /// `Some(bytes)` when the object exists, `None` when the store has no
    /// object of that name
    async fn get(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Removes the object with the given store-assigned id
    ///
    /// # Errors
    /// Returns an error if the id is unknown or the removal fails
    async fn delete(&self, id: &str) -> anyhow::Result<()>;

    /// Lists every object currently held by the store
    ///
    /// The scheduler calls this once per pass to build a name-to-id map for
    /// delete-then-put replacement.
    async fn list(&self) -> anyhow::Result<Vec<RemoteObject>>;
}
