use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use catalog_products::Product;

use crate::error::PersistenceError;
use crate::persistence::LocalStorage;

/// In-memory snapshot storage for tests/ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    inner: RwLock<Option<Vec<Product>>>,
    failing: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-saved list.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            inner: RwLock::new(Some(products)),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `save`/`clear` fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// What was last saved.
    pub fn snapshot(&self) -> Option<Vec<Product>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PersistenceError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl LocalStorage for InMemoryStorage {
    fn load(&self) -> Result<Option<Vec<Product>>, PersistenceError> {
        Ok(self.snapshot())
    }

    fn save(&self, products: &[Product]) -> Result<(), PersistenceError> {
        self.check()?;
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(products.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        self.check()?;
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_saved() {
        let storage = InMemoryStorage::new();
        assert!(storage.load().unwrap().is_none());
        storage.save(&[]).unwrap();
        assert_eq!(storage.load().unwrap(), Some(vec![]));
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn failing_storage_rejects_writes_but_keeps_data() {
        let storage = InMemoryStorage::with_products(vec![]);
        storage.set_failing(true);
        assert!(matches!(storage.save(&[]), Err(PersistenceError::Unavailable)));
        assert!(matches!(storage.clear(), Err(PersistenceError::Unavailable)));
        assert_eq!(storage.load().unwrap(), Some(vec![]));
    }
}
