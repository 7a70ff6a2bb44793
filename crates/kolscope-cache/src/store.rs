use std::marker::PhantomData;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::KvBackend;
use crate::error::CacheError;

/// Serialized wrapper stored per entry; `cached_at` drives expiry.
#[derive(Debug, Serialize, Deserialize)]
struct Entry<T> {
    cached_at: DateTime<Utc>,
    payload: T,
}

/// A decoded, still-live cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub cached_at: DateTime<Utc>,
    pub payload: T,
}

/// TTL-scoped snapshot store over a [`KvBackend`].
///
/// Each store owns one key namespace, so follower and tweet snapshots for the
/// same subject never collide. Expired and undecodable entries both read as
/// misses; a corrupt entry is additionally removed so it cannot shadow a later
/// write.
pub struct SnapshotCache<T> {
    prefix: &'static str,
    ttl: Duration,
    _payload: PhantomData<T>,
}

impl<T> SnapshotCache<T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(prefix: &'static str, ttl: Duration) -> Self {
        Self {
            prefix,
            ttl,
            _payload: PhantomData,
        }
    }

    fn key(&self, subject_id: &str) -> String {
        format!("{}{subject_id}", self.prefix)
    }

    pub fn put(
        &self,
        backend: &dyn KvBackend,
        subject_id: &str,
        payload: &T,
    ) -> Result<(), CacheError> {
        self.put_at(backend, subject_id, payload, Utc::now())
    }

    pub fn put_at(
        &self,
        backend: &dyn KvBackend,
        subject_id: &str,
        payload: &T,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let key = self.key(subject_id);
        let entry = Entry {
            cached_at: now,
            payload,
        };
        let encoded = serde_json::to_string(&entry).map_err(|source| CacheError::Serialize {
            key: key.clone(),
            source,
        })?;
        backend.store(&key, &encoded)
    }

    pub fn get(&self, backend: &dyn KvBackend, subject_id: &str) -> Result<Option<Cached<T>>, CacheError> {
        self.get_at(backend, subject_id, Utc::now())
    }

    pub fn get_at(
        &self,
        backend: &dyn KvBackend,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Cached<T>>, CacheError> {
        let key = self.key(subject_id);
        let Some(raw) = backend.load(&key)? else {
            return Ok(None);
        };

        let entry: Entry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%key, %error, "dropping undecodable cache entry");
                backend.remove(&key)?;
                return Ok(None);
            }
        };

        let age = now.signed_duration_since(entry.cached_at);
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        if age > ttl {
            return Ok(None);
        }
        Ok(Some(Cached {
            cached_at: entry.cached_at,
            payload: entry.payload,
        }))
    }

    /// Writes `payload`, first folding in a live prior entry when one exists.
    ///
    /// Used for partial results: a truncated follower collection can be
    /// combined with what an earlier, fuller run already stored instead of
    /// overwriting it.
    pub fn merge_put_at<F>(
        &self,
        backend: &dyn KvBackend,
        subject_id: &str,
        payload: T,
        now: DateTime<Utc>,
        merge: F,
    ) -> Result<(), CacheError>
    where
        F: FnOnce(T, T) -> T,
    {
        let merged = match self.get_at(backend, subject_id, now)? {
            Some(prior) => merge(prior.payload, payload),
            None => payload,
        };
        self.put_at(backend, subject_id, &merged, now)
    }

    pub fn invalidate(&self, backend: &dyn KvBackend, subject_id: &str) -> Result<(), CacheError> {
        backend.remove(&self.key(subject_id))
    }
}
