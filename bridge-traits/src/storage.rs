//! Durable Key-Value Storage Abstraction
//!
//! Provides a platform-agnostic trait for persistent string key-value storage.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::Result;

/// Durable key-value store trait
///
/// Abstracts platform-specific persistent storage:
/// - iOS: UserDefaults / file-backed storage
/// - Android: SharedPreferences / DataStore
/// - Desktop: SQLite or config files
/// - Web: localStorage / IndexedDB
///
/// Guarantees are intentionally weak: individual `get`/`set`/`remove` calls
/// are atomic per key, but there are no transactions and no atomicity across
/// keys. Callers that maintain derived state across multiple keys must
/// tolerate partial failures.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::DurableStore;
///
/// async fn save_flag(store: &dyn DurableStore) -> Result<()> {
///     store.set("onboarding_done", "true").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Retrieve a value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, overwriting any existing value for the key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key.
    ///
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Check if a key exists without retrieving its value.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// List all stored keys.
    async fn list_keys(&self) -> Result<Vec<String>>;
}

/// In-memory store implementation for testing/development
#[derive(Debug, Default)]
pub struct MemoryDurableStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.lock().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
