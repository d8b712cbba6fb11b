//! Flat key/value persistence.
//!
//! The backing store is deliberately minimal: point get/put on string keys
//! plus lexically ordered list-by-prefix, with no atomicity across keys.
//! Everything richer (threading, ordering, foreign keys) is layered on top
//! through key naming conventions in [`keys`].

pub mod keys;
mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// Byte-level contract every store backend implements.
///
/// `list` must return matching keys in ascending lexical order; the
/// reverse-chronological sort-key scheme depends on it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> anyhow::Result<()>;
    async fn list(&self, prefix: &str) -> anyhow::Result<Vec<String>>;
}

/// Cloneable handle over a store backend with typed accessors.
///
/// Values are UTF-8 text, JSON-encoded text, or raw bytes depending on the
/// accessor the caller picks; the backend only ever sees bytes.
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn KeyValueStore>,
}

impl Store {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    pub async fn get_bytes(&self, key: &str) -> ApiResult<Option<Vec<u8>>> {
        Ok(self.inner.get(key).await?)
    }

    pub async fn get_text(&self, key: &str) -> ApiResult<Option<String>> {
        match self.inner.get(key).await? {
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .with_context(|| format!("stored value at {key} is not UTF-8"))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> ApiResult<Option<T>> {
        match self.inner.get(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("stored value at {key} is not valid JSON"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn put_bytes(&self, key: &str, value: Vec<u8>) -> ApiResult<()> {
        Ok(self.inner.put(key, value).await?)
    }

    pub async fn put_text(&self, key: &str, value: &str) -> ApiResult<()> {
        Ok(self.inner.put(key, value.as_bytes().to_vec()).await?)
    }

    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ApiResult<()> {
        let bytes = serde_json::to_vec(value)
            .with_context(|| format!("failed to encode value for {key}"))
            .map_err(ApiError::Store)?;
        Ok(self.inner.put(key, bytes).await?)
    }

    /// List keys under `prefix` in ascending lexical order.
    pub async fn list(&self, prefix: &str) -> ApiResult<Vec<String>> {
        Ok(self.inner.list(prefix).await?)
    }
}
