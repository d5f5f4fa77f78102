//! In-memory implementation of `LocalStore`.
//!
//! `InMemoryLocalStore` is the reference implementation of the `LocalStore`
//! trait. It keeps all entries in a `HashMap` protected by a `Mutex`,
//! making it safe to share behind an `Arc` between the loader, the gate,
//! and the mutators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use cura_contracts::{
    error::{CuraError, CuraResult},
    keys::StoreKey,
};
use cura_core::traits::LocalStore;

/// A `HashMap`-backed local key-value store.
///
/// The mutex is only held across the map operation itself, never across an
/// await point.
#[derive(Default)]
pub struct InMemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value inspection, for tests and the demo scenarios.
    pub fn raw_value(&self, key: &StoreKey) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key.as_str()).cloned())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LocalStore for InMemoryLocalStore {
    async fn get(&self, key: &StoreKey) -> CuraResult<Option<String>> {
        let entries = self.entries.lock().map_err(|e| CuraError::StorageFailed {
            key: key.as_str().to_string(),
            reason: format!("store lock poisoned: {}", e),
        })?;
        Ok(entries.get(key.as_str()).cloned())
    }

    async fn set(&self, key: &StoreKey, value: &str) -> CuraResult<()> {
        let mut entries = self.entries.lock().map_err(|e| CuraError::StorageFailed {
            key: key.as_str().to_string(),
            reason: format!("store lock poisoned: {}", e),
        })?;
        entries.insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &StoreKey) -> CuraResult<()> {
        let mut entries = self.entries.lock().map_err(|e| CuraError::StorageFailed {
            key: key.as_str().to_string(),
            reason: format!("store lock poisoned: {}", e),
        })?;
        entries.remove(key.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cura_contracts::{keys::Collection, user::UserId};

    use super::*;

    fn key() -> StoreKey {
        StoreKey::per_user(Collection::History, &UserId::new("u1"))
    }

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let store = InMemoryLocalStore::new();
        assert_eq!(store.get(&key()).await.unwrap(), None);

        store.set(&key(), r#"[{"x":1}]"#).await.unwrap();
        assert_eq!(store.get(&key()).await.unwrap().as_deref(), Some(r#"[{"x":1}]"#));

        store.remove(&key()).await.unwrap();
        assert_eq!(store.get(&key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn removing_an_absent_key_is_not_an_error() {
        let store = InMemoryLocalStore::new();
        store.remove(&key()).await.unwrap();
    }

    #[tokio::test]
    async fn set_replaces_the_previous_value() {
        let store = InMemoryLocalStore::new();
        store.set(&key(), "old").await.unwrap();
        store.set(&key(), "new").await.unwrap();
        assert_eq!(store.get(&key()).await.unwrap().as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }
}
