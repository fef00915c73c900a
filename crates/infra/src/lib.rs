//! `catalog-infra` — the product store and its storage backends.
//!
//! - [`store::ProductStore`]: state container with add/get/update/delete/delete-many
//! - [`persistence`]: local snapshot storage (JSON file, in-memory)
//! - [`blob`]: remote image storage (HTTP object store, in-memory)
//! - [`config`]: environment-driven wiring

pub mod blob;
pub mod config;
pub mod error;
pub mod persistence;
pub mod store;

pub use blob::{BlobStore, HttpBlobStore, ImageUpload, InMemoryBlobStore};
pub use config::{BlobConfig, CatalogConfig};
pub use error::{BlobError, ConfigError, PersistenceError, StoreError};
pub use persistence::{InMemoryStorage, JsonFileStorage, LocalStorage};
pub use store::{ProductStore, StoreResult};
