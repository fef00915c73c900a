use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::blob::BlobStore;
use crate::error::BlobError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Map-backed blob store for tests/dev. URLs look like `memory://<bucket>/<key>`.
#[derive(Debug)]
pub struct InMemoryBlobStore {
    bucket: String,
    objects: RwLock<HashMap<String, StoredBlob>>,
    failing: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, url: &str) -> Option<StoredBlob> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prefix(&self) -> String {
        format!("memory://{}/", self.bucket)
    }

    fn check(&self) -> Result<(), BlobError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(BlobError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("products")
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        self.check()?;
        let url = format!("{}{}", self.prefix(), key.trim_start_matches('/'));
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                url.clone(),
                StoredBlob {
                    content_type: content_type.to_string(),
                    bytes,
                },
            );
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        self.check()?;
        if !self.owns(url) {
            return Err(BlobError::ForeignUrl(url.to_string()));
        }
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url);
        Ok(())
    }

    fn owns(&self, url: &str) -> bool {
        url.starts_with(&self.prefix())
    }
}
