//! Storage seam for the image pipeline
//!
//! The pipeline only needs "fetch bytes by key" and "store bytes by key with a
//! content type". S3 backs it in production; the in-memory store backs tests
//! and local runs.

use crate::error::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use s3_utils::{S3Error, S3Operations};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Object body plus the content type storage reported for it
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub data: Bytes,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<FetchedObject, StorageError>;

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

impl From<S3Error> for StorageError {
    fn from(err: S3Error) -> Self {
        match err {
            S3Error::NotFound { bucket, key } => StorageError::NotFound { bucket, key },
            other => StorageError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Operations {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<FetchedObject, StorageError> {
        let object = self.get_object(bucket, key).await?;
        Ok(FetchedObject {
            data: object.body,
            content_type: object.content_type,
        })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        Ok(self.put_object(bucket, key, data, content_type).await?)
    }
}

/// Object stored in [`InMemoryObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
}

/// In-memory object store that records every call
///
/// Writes to keys registered with [`InMemoryObjectStore::fail_store_for`] fail
/// with a backend error, which lets callers observe partial writes.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    fetches: Mutex<Vec<(String, String)>>,
    stores: Mutex<Vec<(String, String)>>,
    failing_store_keys: Mutex<HashSet<String>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without recording a store call
    pub fn insert(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) {
        locked(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.into(),
                content_type: content_type.map(str::to_string),
            },
        );
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        locked(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Make every store to `key` (any bucket) fail
    pub fn fail_store_for(&self, key: &str) {
        locked(&self.failing_store_keys).insert(key.to_string());
    }

    /// `(bucket, key)` of every fetch attempt, in call order
    pub fn fetches(&self) -> Vec<(String, String)> {
        locked(&self.fetches).clone()
    }

    /// `(bucket, key)` of every successful store, in call order
    pub fn stores(&self) -> Vec<(String, String)> {
        locked(&self.stores).clone()
    }

    /// Keys currently held in `bucket`, sorted
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = locked(&self.objects)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<FetchedObject, StorageError> {
        locked(&self.fetches).push((bucket.to_string(), key.to_string()));

        locked(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .map(|object| FetchedObject {
                data: object.data.clone(),
                content_type: object.content_type.clone(),
            })
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if locked(&self.failing_store_keys).contains(key) {
            return Err(StorageError::Backend(format!(
                "injected store failure for {bucket}/{key}"
            )));
        }

        locked(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data,
                content_type: Some(content_type.to_string()),
            },
        );
        locked(&self.stores).push((bucket.to_string(), key.to_string()));
        Ok(())
    }
}
