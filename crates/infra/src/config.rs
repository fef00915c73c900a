//! Environment-driven configuration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::blob::HttpBlobStore;
use crate::error::{ConfigError, StoreError};
use crate::persistence::{JsonFileStorage, json_file};
use crate::store::ProductStore;

pub const DATA_FILE_ENV: &str = "CATALOG_DATA_FILE";
pub const BLOB_ENDPOINT_ENV: &str = "CATALOG_BLOB_ENDPOINT";
pub const BLOB_BUCKET_ENV: &str = "CATALOG_BLOB_BUCKET";
pub const BLOB_TOKEN_ENV: &str = "CATALOG_BLOB_TOKEN";
pub const BLOB_PUBLIC_URL_ENV: &str = "CATALOG_BLOB_PUBLIC_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobConfig {
    pub endpoint: String,
    pub bucket: String,
    pub token: Option<String>,
    pub public_url: Option<String>,
}

impl BlobConfig {
    pub fn build(&self) -> HttpBlobStore {
        let mut store = HttpBlobStore::new(&self.endpoint, &self.bucket);
        if let Some(token) = &self.token {
            store = store.with_token(token);
        }
        if let Some(public_url) = &self.public_url {
            store = store.with_public_url(public_url);
        }
        store
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// JSON snapshot location.
    pub data_file: PathBuf,
    /// Remote image storage; images are inlined when absent.
    pub blob: Option<BlobConfig>,
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_file = match var(DATA_FILE_ENV) {
            Some(path) => PathBuf::from(path),
            None => json_file::default_path()?,
        };

        let blob = match (var(BLOB_ENDPOINT_ENV), var(BLOB_BUCKET_ENV)) {
            (Some(endpoint), Some(bucket)) => Some(BlobConfig {
                endpoint,
                bucket,
                token: var(BLOB_TOKEN_ENV),
                public_url: var(BLOB_PUBLIC_URL_ENV),
            }),
            (Some(_), None) => return Err(ConfigError::IncompleteBlob(BLOB_BUCKET_ENV)),
            (None, Some(_)) => return Err(ConfigError::IncompleteBlob(BLOB_ENDPOINT_ENV)),
            (None, None) => None,
        };

        Ok(Self { data_file, blob })
    }

    /// Open the store this configuration describes.
    pub fn open_store(&self) -> Result<ProductStore, StoreError> {
        let storage = Arc::new(JsonFileStorage::new(&self.data_file));
        let store = ProductStore::open(storage)?;

        Ok(match &self.blob {
            Some(blob) => {
                tracing::info!(endpoint = %blob.endpoint, bucket = %blob.bucket, "using remote image storage");
                store.with_blob_store(Arc::new(blob.build()))
            }
            None => store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn data_file_override_and_no_blob() {
        let config = CatalogConfig::from_lookup(lookup(&[(DATA_FILE_ENV, "/tmp/p.json")])).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/p.json"));
        assert!(config.blob.is_none());
    }

    #[test]
    fn blob_config_needs_endpoint_and_bucket() {
        let config = CatalogConfig::from_lookup(lookup(&[
            (DATA_FILE_ENV, "p.json"),
            (BLOB_ENDPOINT_ENV, "https://storage.example.com"),
            (BLOB_BUCKET_ENV, "catalog"),
            (BLOB_TOKEN_ENV, "  "),
        ]))
        .unwrap();
        let blob = config.blob.unwrap();
        assert_eq!(blob.bucket, "catalog");
        assert_eq!(blob.token, None);

        let err = CatalogConfig::from_lookup(lookup(&[
            (DATA_FILE_ENV, "p.json"),
            (BLOB_ENDPOINT_ENV, "https://storage.example.com"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::IncompleteBlob(BLOB_BUCKET_ENV));
    }

    #[test]
    fn open_store_reads_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig {
            data_file: dir.path().join("products.json"),
            blob: None,
        };
        let store = config.open_store().unwrap();
        assert!(store.is_empty());
        assert!(!store.has_blob_store());
    }
}
