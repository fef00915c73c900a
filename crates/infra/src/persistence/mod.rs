//! Local persistence of the product list.
//!
//! The whole list is saved on every mutation: the catalog is small and a
//! snapshot keeps the on-disk state trivially consistent.

pub mod in_memory;
pub mod json_file;

use std::sync::Arc;

use catalog_products::Product;

use crate::error::PersistenceError;

pub use in_memory::InMemoryStorage;
pub use json_file::JsonFileStorage;

/// Snapshot storage for the product list.
pub trait LocalStorage: Send + Sync {
    /// The stored list, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<Product>>, PersistenceError>;

    /// Replace the stored list.
    fn save(&self, products: &[Product]) -> Result<(), PersistenceError>;

    /// Forget the stored list.
    fn clear(&self) -> Result<(), PersistenceError>;
}

impl<S> LocalStorage for Arc<S>
where
    S: LocalStorage + ?Sized,
{
    fn load(&self) -> Result<Option<Vec<Product>>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, products: &[Product]) -> Result<(), PersistenceError> {
        (**self).save(products)
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}
