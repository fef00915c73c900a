//! Infrastructure error model.

use std::path::PathBuf;

use thiserror::Error;

use catalog_core::DomainError;

/// Local persistence failure.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize products: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The stored snapshot exists but cannot be used.
    #[error("corrupt product snapshot: {0}")]
    Corrupt(String),

    /// Injected by test backends.
    #[error("storage unavailable")]
    Unavailable,
}

impl PersistenceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Blob (object) store failure.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Rejected before anything was sent.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("blob request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("blob store answered {status} for {url}")]
    Status { status: u16, url: String },

    /// The URL does not point into this store.
    #[error("not a blob in this store: {0}")]
    ForeignUrl(String),

    #[error("failed to read image {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Injected by test backends.
    #[error("blob store unavailable")]
    Unavailable,
}

/// Configuration failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("could not resolve a data directory; set CATALOG_DATA_FILE")]
    NoDataDir,

    #[error("incomplete blob store configuration: {0} is not set")]
    IncompleteBlob(&'static str),
}

/// Error returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("blob store failed: {0}")]
    Blob(#[from] BlobError),
}

impl StoreError {
    /// Domain error, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<catalog_products::ValidationErrors> for StoreError {
    fn from(value: catalog_products::ValidationErrors) -> Self {
        StoreError::Domain(value.into())
    }
}
