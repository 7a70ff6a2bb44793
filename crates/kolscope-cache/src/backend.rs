use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::CacheError;

/// String-keyed storage for serialized cache entries.
///
/// Implementations only move opaque strings; serialization, namespacing and
/// expiry all live in [`crate::SnapshotCache`].
pub trait KvBackend: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn store(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process backend over a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::Backend {
            context: "memory backend mutex poisoned".to_owned(),
        })
    }
}

impl KvBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
