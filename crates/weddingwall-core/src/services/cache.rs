//! Local cache store
//!
//! A string key/value store that survives restarts. Gallery collections,
//! the session token and the user profile are kept here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::db::Database;
use crate::models::{Collection, PhotoRecord};
use crate::utils::error::{AppError, AppResult};

/// Key/value persistence used by the sync engine and the session manager.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// Shared reference to a CacheStore implementation.
pub type SharedCacheStore = Arc<dyn CacheStore>;

impl CacheStore for Database {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.get_cache_entry(key)?.map(|entry| entry.payload))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.put_cache_entry(key, value)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.delete_cache_entry(key).map(|_| ())
    }
}

/// In-memory store for tests and kiosks that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| AppError::General(format!("cache lock poisoned: {}", e)))
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Read the cached photos of a collection.
///
/// An entry that does not parse is treated as absent.
pub fn load_photos(store: &dyn CacheStore, collection: Collection) -> AppResult<Option<Vec<PhotoRecord>>> {
    let Some(raw) = store.get(collection.cache_key())? else {
        return Ok(None);
    };

    match serde_json::from_str::<Vec<PhotoRecord>>(&raw) {
        Ok(photos) => Ok(Some(photos)),
        Err(e) => {
            tracing::warn!(
                collection = %collection,
                "Ignoring unreadable cache entry: {}",
                e
            );
            Ok(None)
        }
    }
}

/// Overwrite the cached photos of a collection.
pub fn store_photos(store: &dyn CacheStore, collection: Collection, photos: &[PhotoRecord]) -> AppResult<()> {
    let json = serde_json::to_string(photos)?;
    store.set(collection.cache_key(), &json)
}
