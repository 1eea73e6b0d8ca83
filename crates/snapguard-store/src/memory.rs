//! In-memory blob store
//!
//! A complete [`IBlobStore`] implementation backed by a map, used by
//! scheduler tests and available as an offline stand-in. It enforces the
//! port's replace discipline: `put` refuses an already-present name, so a
//! caller that forgets the delete-before-put step fails loudly in tests
//! instead of silently overwriting.

use std::collections::HashMap;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use snapguard_core::ports::{IBlobStore, RemoteObject};
use tokio::sync::Mutex;
use uuid::Uuid;

/// One stored object
#[derive(Debug, Clone)]
struct StoredObject {
    id: String,
    bytes: Vec<u8>,
    uploaded_at: DateTime<Utc>,
}

/// Map-backed blob store keyed by object name
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryBlobStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    /// True when the store holds no objects
    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }

    /// True when an object with this name is present
    pub async fn contains(&self, name: &str) -> bool {
        self.objects.lock().await.contains_key(name)
    }
}

#[async_trait::async_trait]
impl IBlobStore for MemoryBlobStore {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String> {
        let mut objects = self.objects.lock().await;
        if objects.contains_key(name) {
            bail!("object name already exists: {name}");
        }

        let id = Uuid::new_v4().to_string();
        objects.insert(
            name.to_string(),
            StoredObject {
                id: id.clone(),
                bytes,
                uploaded_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let objects = self.objects.lock().await;
        Ok(objects.get(name).map(|o| o.bytes.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut objects = self.objects.lock().await;
        let name = objects
            .iter()
            .find(|(_, o)| o.id == id)
            .map(|(name, _)| name.clone());

        match name {
            Some(name) => {
                objects.remove(&name);
                Ok(())
            }
            None => bail!("unknown object id: {id}"),
        }
    }

    async fn list(&self) -> Result<Vec<RemoteObject>> {
        let objects = self.objects.lock().await;
        Ok(objects
            .iter()
            .map(|(name, o)| RemoteObject {
                id: o.id.clone(),
                name: name.clone(),
                size: o.bytes.len() as u64,
                uploaded_at: o.uploaded_at,
            })
            .collect())
    }
}
