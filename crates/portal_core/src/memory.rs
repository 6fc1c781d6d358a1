//! In-memory key-value storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::ports::{KeyValueStore, PortError, PortResult};

/// A `KeyValueStore` that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, e.g. a snapshot left behind by an earlier run.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// The raw stored text, for inspection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }
}

fn poisoned() -> PortError {
    PortError::Unexpected("in-memory storage lock poisoned".to_string())
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().map_err(|_| poisoned())?.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .write()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.write().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}
