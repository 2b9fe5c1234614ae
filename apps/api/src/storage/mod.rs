//! Persistence adapter: one JSON document per entity key.
//!
//! Every entity lives under one of six fixed keys: collections (tasks, schedules,
//! wishlist) are stored as a JSON array, singletons (resume, budget, settings) as
//! a JSON object. There is no versioning or migration of stored documents.
//!
//! Backends implement [`KvStore`] and are injected through `AppState` as
//! `Arc<dyn KvStore>`, so tests run against [`MemoryStore`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Postgres error: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Stored value under '{key}' is not valid JSON for its entity: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The fixed set of logical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Tasks,
    Schedules,
    Resume,
    Wishlist,
    WishlistBudget,
    Settings,
}

impl StorageKey {
    #[cfg(test)]
    pub const ALL: [StorageKey; 6] = [
        StorageKey::Tasks,
        StorageKey::Schedules,
        StorageKey::Resume,
        StorageKey::Wishlist,
        StorageKey::WishlistBudget,
        StorageKey::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Tasks => "tasks",
            StorageKey::Schedules => "schedules",
            StorageKey::Resume => "resume",
            StorageKey::Wishlist => "wishlist",
            StorageKey::WishlistBudget => "wishlist_budget",
            StorageKey::Settings => "settings",
        }
    }
}

/// Raw key/value backend. Values are whole JSON documents; last write wins.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn backend(&self) -> &'static str;
}

/// Typed access to the key/value backend.
///
/// Every write holds one process-wide lock. Read-modify-write of a single
/// collection goes through [`Storage::update_collection`]; cycles that span several
/// keys take the lock once with [`Storage::lock`]. Separate processes sharing one
/// backend still race.
#[derive(Clone)]
pub struct Storage {
    kv: Arc<dyn KvStore>,
    prefix: String,
    write_lock: Arc<Mutex<()>>,
}

impl Storage {
    pub fn new(kv: Arc<dyn KvStore>, prefix: impl Into<String>) -> Self {
        Self {
            kv,
            prefix: prefix.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()), "secretary")
    }

    pub fn backend(&self) -> &'static str {
        self.kv.backend()
    }

    fn full_key(&self, key: StorageKey) -> String {
        if self.prefix.is_empty() {
            key.as_str().to_string()
        } else {
            format!("{}:{}", self.prefix, key.as_str())
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StoreError> {
        let full_key = self.full_key(key);
        match self.kv.get(&full_key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: full_key,
                    source,
                }),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<(), StoreError> {
        let full_key = self.full_key(key);
        let value = serde_json::to_value(value).map_err(|source| StoreError::Serialize {
            key: full_key.clone(),
            source,
        })?;
        debug!("Writing {}", full_key);
        self.kv.set(&full_key, value).await
    }

    /// Loads a whole collection; a missing key is an empty collection.
    pub async fn load_collection<T: DeserializeOwned>(
        &self,
        key: StorageKey,
    ) -> Result<Vec<T>, StoreError> {
        Ok(self.read(key).await?.unwrap_or_default())
    }

    /// Takes the write lock for a read-modify-write cycle over several keys.
    ///
    /// Writes through the guard are not atomic as a group: a backend failure part
    /// way leaves the earlier writes in place.
    pub async fn lock(&self) -> LockedStorage<'_> {
        LockedStorage {
            storage: self,
            _guard: self.write_lock.lock().await,
        }
    }

    /// Loads a collection, lets `f` mutate it, and writes it back under the write lock.
    ///
    /// The collection is written back only when `f` reports a change.
    pub async fn update_collection<T, R, F>(&self, key: StorageKey, f: F) -> Result<R, StoreError>
    where
        T: DeserializeOwned + Serialize + Send,
        F: FnOnce(&mut Vec<T>) -> (R, bool) + Send,
    {
        let locked = self.lock().await;
        let mut items: Vec<T> = locked.load_collection(key).await?;
        let (result, changed) = f(&mut items);
        if changed {
            locked.write(key, &items).await?;
        }
        Ok(result)
    }

    pub async fn get_singleton<T: DeserializeOwned>(
        &self,
        key: StorageKey,
    ) -> Result<Option<T>, StoreError> {
        self.read(key).await
    }

    pub async fn save_singleton<T: Serialize + Sync>(
        &self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), StoreError> {
        self.lock().await.write(key, value).await
    }

    pub async fn clear_singleton(&self, key: StorageKey) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove(&self.full_key(key)).await
    }
}

/// Exclusive access to the store, held until dropped.
pub struct LockedStorage<'a> {
    storage: &'a Storage,
    _guard: MutexGuard<'a, ()>,
}

impl LockedStorage<'_> {
    pub async fn load_collection<T: DeserializeOwned>(
        &self,
        key: StorageKey,
    ) -> Result<Vec<T>, StoreError> {
        Ok(self.storage.read(key).await?.unwrap_or_default())
    }

    pub async fn get_singleton<T: DeserializeOwned>(
        &self,
        key: StorageKey,
    ) -> Result<Option<T>, StoreError> {
        self.storage.read(key).await
    }

    pub async fn write<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), StoreError> {
        self.storage.write(key, value).await
    }
}
