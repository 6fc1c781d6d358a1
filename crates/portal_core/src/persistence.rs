//! crates/portal_core/src/persistence.rs
//!
//! The persistent store: typed JSON load/save on top of a `KeyValueStore`.
//!
//! Loading never fails. A missing key, an unreadable backend or a blob that no
//! longer deserializes all come back as "no data yet", with a warning logged.

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::ports::{KeyValueStore, PortError, PortResult};

/// Storage keys used by the portal.
pub mod keys {
    pub const ASSIGNMENTS: &str = "assignments";
    pub const SUBMISSIONS: &str = "submissions";
    /// The signed-in identity.
    pub const USER: &str = "user";
    /// The identity directory.
    pub const USERS: &str = "users";
}

#[derive(Clone)]
pub struct Persistence {
    kv: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Loads the collection stored under `key`, or an empty one.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.load_record::<Vec<T>>(key).await.unwrap_or_default()
    }

    /// Writes the whole collection under `key`. Empty collections are written
    /// too, so a reload never resurrects deleted items.
    pub async fn save<T: Serialize + Sync>(&self, key: &str, items: &[T]) -> PortResult<()> {
        self.save_record(key, &items).await
    }

    pub async fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read '{}' from storage, starting empty: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unreadable '{}' snapshot: {}", key, e);
                None
            }
        }
    }

    pub async fn save_record<T: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> PortResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| PortError::Unexpected(format!("Failed to serialize '{}': {}", key, e)))?;
        self.kv.put(key, &json).await
    }

    pub async fn clear(&self, key: &str) -> PortResult<()> {
        self.kv.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKeyValueStore;

    #[tokio::test]
    async fn missing_key_loads_empty() {
        let persistence = Persistence::new(Arc::new(InMemoryKeyValueStore::new()));
        let items: Vec<String> = persistence.load(keys::ASSIGNMENTS).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn corrupt_blob_loads_empty() {
        let kv = InMemoryKeyValueStore::new().with_entry(keys::SUBMISSIONS, "{not json");
        let persistence = Persistence::new(Arc::new(kv));
        let items: Vec<String> = persistence.load(keys::SUBMISSIONS).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn empty_collection_overwrites_previous_snapshot() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let persistence = Persistence::new(kv.clone());

        persistence
            .save(keys::ASSIGNMENTS, &["a".to_string(), "b".to_string()][..])
            .await
            .unwrap();
        persistence
            .save::<String>(keys::ASSIGNMENTS, &[])
            .await
            .unwrap();

        assert_eq!(kv.raw(keys::ASSIGNMENTS).as_deref(), Some("[]"));
        let items: Vec<String> = persistence.load(keys::ASSIGNMENTS).await;
        assert!(items.is_empty());
    }
}
